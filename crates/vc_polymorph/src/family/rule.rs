use alloc::borrow::Cow;
use core::fmt;

use crate::TypeHandle;
use crate::family::{FamilyRegistry, Polymorphic};

// -----------------------------------------------------------------------------
// Discriminator

/// How the discriminator value of a [`DiscriminatorRule`] is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discriminator {
    /// The value stands for the target type's own name.
    ///
    /// The name is supplied at registration time instead of being read from
    /// the type, so the mapping stays auditable and independent of
    /// [`core::any::type_name`], whose output is not stable across compilers.
    TypeName(Cow<'static, str>),
    /// An arbitrary value, unrelated to the target type's name.
    Literal(Cow<'static, str>),
}

impl Discriminator {
    /// Returns the value written into, and matched against, documents.
    #[inline]
    pub fn value(&self) -> &str {
        match self {
            Self::TypeName(name) => name,
            Self::Literal(literal) => literal,
        }
    }

    #[inline]
    pub(crate) fn value_cow(&self) -> &Cow<'static, str> {
        match self {
            Self::TypeName(name) | Self::Literal(name) => name,
        }
    }
}

// -----------------------------------------------------------------------------
// DiscriminatorRule

/// One registered mapping from a base type to a concrete subtype.
///
/// A document whose `property` field holds the discriminator value is read as
/// the `target` type, and an instance of `target` is written with that field.
///
/// Rules built with [`nested`](Self::nested) additionally remember how to
/// register the target's own [`FamilyMeta`](crate::FamilyMeta), so registering
/// a base type pulls in every family declared below it.
///
/// # Examples
///
/// ```
/// use vc_polymorph::{Discriminator, DiscriminatorRule};
///
/// struct Circle;
///
/// let rule = DiscriminatorRule::by_literal::<Circle>("shapeType", "circle");
/// assert!(rule.target().is::<Circle>());
/// assert_eq!(rule.property(), "shapeType");
/// assert_eq!(rule.literal(), "circle");
/// assert_eq!(rule.kind(), &Discriminator::Literal("circle".into()));
/// ```
#[derive(Clone)]
pub struct DiscriminatorRule {
    target: TypeHandle,
    property: Cow<'static, str>,
    kind: Discriminator,
    register: Option<fn(&mut FamilyRegistry)>,
}

impl DiscriminatorRule {
    /// Creates a rule for a target type that declares no family of its own.
    pub fn new<T: ?Sized + 'static>(
        property: impl Into<Cow<'static, str>>,
        kind: Discriminator,
    ) -> Self {
        Self::with_handle(TypeHandle::of::<T>(), property, kind)
    }

    /// Creates a rule from an explicit [`TypeHandle`].
    ///
    /// Nothing is known about the target's own metadata, so it is treated
    /// as a leaf unless it is registered separately.
    pub fn with_handle(
        target: TypeHandle,
        property: impl Into<Cow<'static, str>>,
        kind: Discriminator,
    ) -> Self {
        Self {
            target,
            property: property.into(),
            kind,
            register: None,
        }
    }

    /// Creates a rule whose target is itself [`Polymorphic`].
    ///
    /// Registering the family holding this rule also registers `T`.
    pub fn nested<T: Polymorphic>(
        property: impl Into<Cow<'static, str>>,
        kind: Discriminator,
    ) -> Self {
        Self {
            register: Some(FamilyRegistry::register::<T>),
            ..Self::new::<T>(property, kind)
        }
    }

    /// Shorthand for [`new`](Self::new) with [`Discriminator::Literal`].
    #[inline]
    pub fn by_literal<T: ?Sized + 'static>(
        property: impl Into<Cow<'static, str>>,
        literal: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new::<T>(property, Discriminator::Literal(literal.into()))
    }

    /// Shorthand for [`new`](Self::new) with [`Discriminator::TypeName`].
    #[inline]
    pub fn by_type_name<T: ?Sized + 'static>(
        property: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new::<T>(property, Discriminator::TypeName(name.into()))
    }

    /// The concrete type being registered.
    #[inline(always)]
    pub const fn target(&self) -> TypeHandle {
        self.target
    }

    /// The document field carrying the discriminator.
    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline(always)]
    pub const fn kind(&self) -> &Discriminator {
        &self.kind
    }

    /// The effective discriminator value.
    #[inline]
    pub fn literal(&self) -> &str {
        self.kind.value()
    }

    /// Returns `true` if the target's family is registered along with this rule.
    #[inline]
    pub const fn is_nested(&self) -> bool {
        self.register.is_some()
    }

    #[inline]
    pub(crate) fn property_cow(&self) -> &Cow<'static, str> {
        &self.property
    }

    #[inline]
    pub(crate) const fn register_hook(&self) -> Option<fn(&mut FamilyRegistry)> {
        self.register
    }
}

// The registration hook is derived from `target`, so it takes no part in equality.
impl PartialEq for DiscriminatorRule {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.property == other.property && self.kind == other.kind
    }
}

impl Eq for DiscriminatorRule {}

impl fmt::Debug for DiscriminatorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscriminatorRule")
            .field("target", &self.target)
            .field("property", &self.property)
            .field("kind", &self.kind)
            .field("nested", &self.is_nested())
            .finish()
    }
}
