use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::TypeHandle;
use crate::family::{Discriminator, DiscriminatorRule, FamilyRegistry};

// -----------------------------------------------------------------------------
// FamilyMeta

/// The polymorphism declaration attached to a type.
///
/// It names the base type its rules are declared against, and lists the
/// directly registered subtypes in declaration order. A type that is itself
/// a subtype may carry a `FamilyMeta` of its own to open a nested family.
///
/// Usually produced by [`Polymorphic::family_meta`], either by hand or through
/// [`impl_polymorphic!`](crate::impl_polymorphic).
///
/// # Examples
///
/// ```
/// use vc_polymorph::FamilyMeta;
///
/// struct Shape;
/// struct Circle;
/// struct Square;
///
/// let meta = FamilyMeta::new::<Shape>()
///     .literal::<Circle>("shapeType", "circle")
///     .type_name::<Square>("shapeType", "Square");
///
/// assert!(meta.base().is::<Shape>());
/// assert_eq!(meta.rules().len(), 2);
/// assert_eq!(meta.rules()[1].literal(), "Square");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyMeta {
    base: TypeHandle,
    rules: Vec<DiscriminatorRule>,
}

impl FamilyMeta {
    /// Creates an empty declaration for the family rooted at `B`.
    #[inline]
    pub fn new<B: ?Sized + 'static>() -> Self {
        Self::with_base(TypeHandle::of::<B>())
    }

    /// Creates an empty declaration for the family rooted at `base`.
    #[inline]
    pub const fn with_base(base: TypeHandle) -> Self {
        Self {
            base,
            rules: Vec::new(),
        }
    }

    /// The base type the rules are declared against.
    #[inline(always)]
    pub const fn base(&self) -> TypeHandle {
        self.base
    }

    /// The directly registered rules, in declaration order.
    #[inline]
    pub fn rules(&self) -> &[DiscriminatorRule] {
        &self.rules
    }

    /// Appends a rule.
    #[inline]
    pub fn push(&mut self, rule: DiscriminatorRule) {
        self.rules.push(rule);
    }

    /// Appends a rule, builder style.
    #[inline]
    pub fn with_rule(mut self, rule: DiscriminatorRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registers the leaf `T` under an arbitrary literal.
    pub fn literal<T: ?Sized + 'static>(
        self,
        property: impl Into<Cow<'static, str>>,
        literal: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.with_rule(DiscriminatorRule::by_literal::<T>(property, literal))
    }

    /// Registers the leaf `T` under its declared type name.
    pub fn type_name<T: ?Sized + 'static>(
        self,
        property: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.with_rule(DiscriminatorRule::by_type_name::<T>(property, name))
    }

    /// Registers the polymorphic `T` under an arbitrary literal.
    pub fn nested_literal<T: Polymorphic>(
        self,
        property: impl Into<Cow<'static, str>>,
        literal: impl Into<Cow<'static, str>>,
    ) -> Self {
        let kind = Discriminator::Literal(literal.into());
        self.with_rule(DiscriminatorRule::nested::<T>(property, kind))
    }

    /// Registers the polymorphic `T` under its declared type name.
    pub fn nested_type_name<T: Polymorphic>(
        self,
        property: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        let kind = Discriminator::TypeName(name.into());
        self.with_rule(DiscriminatorRule::nested::<T>(property, kind))
    }
}

// -----------------------------------------------------------------------------
// Polymorphic

/// A type that opts into polymorphic resolution by supplying its [`FamilyMeta`].
///
/// # Implementation
///
/// With [`impl_polymorphic!`](crate::impl_polymorphic):
///
/// ```
/// use vc_polymorph::{Polymorphic, impl_polymorphic};
///
/// struct Shape;
/// struct Circle;
///
/// impl_polymorphic!(Shape => [
///     literal(Circle, "shapeType", "circle"),
/// ]);
///
/// assert_eq!(Shape::family_meta().rules().len(), 1);
/// ```
///
/// ## Manually
///
/// ```
/// use vc_polymorph::{FamilyMeta, Polymorphic};
///
/// struct Shape;
/// struct Circle;
///
/// impl Polymorphic for Shape {
///     fn family_meta() -> FamilyMeta {
///         FamilyMeta::new::<Shape>().literal::<Circle>("shapeType", "circle")
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Polymorphic` so cannot declare discriminated subtypes",
    note = "consider declaring its subtypes with `impl_polymorphic!`"
)]
pub trait Polymorphic: 'static {
    /// Returns the declaration of the family this type roots or re-declares.
    fn family_meta() -> FamilyMeta;

    /// Registers other families needed by this type.
    ///
    /// Targets of [`nested`](DiscriminatorRule::nested) rules are registered
    /// automatically; this hook is for anything else.
    fn register_dependencies(_registry: &mut FamilyRegistry) {}
}
