use alloc::vec::Vec;

use hashbrown::hash_map::Entry;

use crate::TypeHandle;
use crate::family::{FamilyMeta, Polymorphic};
use crate::utils::{TypeMap, new_map};

// -----------------------------------------------------------------------------
// FamilyRegistry

/// The static metadata of every type taking part in polymorphism,
/// keyed by the type carrying it.
///
/// A type absent from the registry does not participate: resolving against it
/// is a pass-through. The registry itself never builds caches, see
/// [`Polymorph`](crate::Polymorph) for that.
///
/// # Example
///
/// ```
/// use vc_polymorph::{FamilyRegistry, TypeHandle, impl_polymorphic};
///
/// struct Shape;
/// struct Polygon;
/// struct Circle;
/// struct Triangle;
///
/// impl_polymorphic!(Shape => [
///     literal(Circle, "shapeType", "circle"),
///     nested_literal(Polygon, "shapeType", "polygon"),
/// ]);
/// impl_polymorphic!(Polygon => [
///     literal(Triangle, "corners", "3"),
/// ]);
///
/// let mut registry = FamilyRegistry::new();
/// registry.register::<Shape>();
///
/// // The nested family comes along.
/// assert!(registry.contains(TypeHandle::of::<Polygon>()));
/// assert!(!registry.contains(TypeHandle::of::<Circle>()));
/// ```
pub struct FamilyRegistry {
    families: TypeMap<FamilyMeta>,
    #[cfg_attr(not(feature = "auto_register"), expect(dead_code))]
    auto_registered: bool,
}

impl FamilyRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            families: new_map(),
            auto_registered: false,
        }
    }

    /// Registers `T` if it is not registered yet, then its dependencies.
    ///
    /// If `T` is already present nothing happens, and neither are its
    /// dependencies visited again; a hierarchy that loops back onto itself
    /// terminates. Use [`insert`](Self::insert) to overwrite.
    pub fn register<T: Polymorphic>(&mut self) {
        if self.try_insert(TypeHandle::of::<T>(), T::family_meta()) {
            T::register_dependencies(self);
        }
    }

    /// Inserts `meta` for `ty` if absent, then registers the targets
    /// of its nested rules. Returns `false` if `ty` was already present.
    pub fn try_insert(&mut self, ty: TypeHandle, meta: FamilyMeta) -> bool {
        let hooks: Vec<_> = meta
            .rules()
            .iter()
            .filter_map(|rule| rule.register_hook())
            .collect();

        let Entry::Vacant(entry) = self.families.entry(ty) else {
            return false;
        };
        entry.insert(meta);
        for hook in hooks {
            hook(self);
        }
        true
    }

    /// Inserts or **overwrites** the metadata of `ty`, returning the old one.
    ///
    /// Dependencies are not registered.
    pub fn insert(&mut self, ty: TypeHandle, meta: FamilyMeta) -> Option<FamilyMeta> {
        self.families.insert(ty, meta)
    }

    /// Removes the metadata of `ty`; it stops participating.
    pub fn remove(&mut self, ty: TypeHandle) -> Option<FamilyMeta> {
        self.families.remove(&ty)
    }

    /// Returns the metadata carried by `ty`, if it participates.
    #[inline]
    pub fn get(&self, ty: TypeHandle) -> Option<&FamilyMeta> {
        self.families.get(&ty)
    }

    #[inline]
    pub fn get_type<T: ?Sized + 'static>(&self) -> Option<&FamilyMeta> {
        self.get(TypeHandle::of::<T>())
    }

    #[inline]
    pub fn contains(&self, ty: TypeHandle) -> bool {
        self.families.contains_key(&ty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Iterates over the registered types and their metadata, in an order fixed by their content.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TypeHandle, &FamilyMeta)> {
        self.families.iter().map(|(ty, meta)| (*ty, meta))
    }

    /// Registers every family submitted through
    /// [`impl_auto_register!`](crate::impl_auto_register).
    ///
    /// Returns `true` if static registration works on the current platform;
    /// repeated calls are cheap. Without the `auto_register` feature this
    /// does nothing and returns `false`.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                crate::__macro_exports::auto_register::register_all(self);
            }
            self.auto_registered
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    #[cfg(feature = "auto_register")]
    pub(crate) fn mark_auto_registered(&mut self) {
        self.auto_registered = true;
    }
}

impl Default for FamilyRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FamilyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
