use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// TypeHandle

/// The identity of a type taking part in polymorphic resolution.
///
/// Equality and hashing only consider the [`TypeId`]; the type path is kept
/// for diagnostics and never used as a key.
///
/// # Examples
///
/// ```
/// use vc_polymorph::TypeHandle;
///
/// struct Circle;
///
/// let handle = TypeHandle::of::<Circle>();
/// assert!(handle.is::<Circle>());
/// assert!(!handle.is::<String>());
/// assert!(handle.path().ends_with("Circle"));
/// ```
#[derive(Clone, Copy)]
pub struct TypeHandle {
    id: TypeId,
    path: &'static str,
}

impl TypeHandle {
    /// Returns the handle of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] .
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path, as reported by [`core::any::type_name`].
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns `true` if this is the handle of `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeHandle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}
