#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern crates

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod collect;
mod document;
mod error;
mod handle;
mod polymorph;
mod utils;

pub mod family;

#[cfg(feature = "json")]
pub mod json;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-level exports

pub use cache::{DiscriminatorConflict, ResolutionCache, TypeTag};
pub use collect::collect;
pub use document::Document;
pub use error::PolymorphError;
pub use family::{Discriminator, DiscriminatorRule, FamilyMeta, FamilyRegistry, Polymorphic};
pub use handle::TypeHandle;
pub use polymorph::Polymorph;

// -----------------------------------------------------------------------------
// Macros

/// Implements [`Polymorphic`] from a list of rules.
///
/// Each rule is `method(Target, property, value)`, where `method` is one of
/// the [`FamilyMeta`] builder methods: `literal`, `type_name`,
/// `nested_literal` or `nested_type_name`. Rules keep their listed order.
///
/// `Sub as Base => [...]` makes `Sub` carry a declaration of `Base`'s family
/// instead of opening its own.
///
/// # Examples
///
/// ```
/// use vc_polymorph::{FamilyRegistry, Polymorphic, TypeHandle, impl_polymorphic};
///
/// struct Animal;
/// struct Dog;
/// struct Cat;
/// struct Lion;
///
/// impl_polymorphic!(Animal => [
///     literal(Dog, "kind", "dog"),
///     nested_type_name(Cat, "kind", "Cat"),
/// ]);
///
/// impl_polymorphic!(Cat => [
///     literal(Lion, "species", "lion"),
/// ]);
///
/// let meta = Animal::family_meta();
/// assert!(meta.base().is::<Animal>());
/// assert!(meta.rules()[1].is_nested());
/// ```
#[macro_export]
macro_rules! impl_polymorphic {
    ($ty:ty as $base:ty => [$($kind:ident($target:ty, $property:expr, $value:expr)),* $(,)?]) => {
        impl $crate::Polymorphic for $ty {
            fn family_meta() -> $crate::FamilyMeta {
                $crate::FamilyMeta::new::<$base>()
                    $(.$kind::<$target>($property, $value))*
            }
        }
    };
    ($base:ty => [$($kind:ident($target:ty, $property:expr, $value:expr)),* $(,)?]) => {
        $crate::impl_polymorphic!($base as $base => [$($kind($target, $property, $value)),*]);
    };
}

/// Submits [`Polymorphic`] types for [`FamilyRegistry::auto_register`].
///
/// Expands to nothing without the `auto_register` feature.
///
/// ```
/// use vc_polymorph::{FamilyRegistry, TypeHandle, impl_auto_register, impl_polymorphic};
///
/// struct Event;
/// struct Click;
///
/// impl_polymorphic!(Event => [literal(Click, "event", "click")]);
/// impl_auto_register!(Event);
///
/// fn main() {
///     let mut registry = FamilyRegistry::new();
///     if registry.auto_register() {
///         assert!(registry.contains(TypeHandle::of::<Event>()));
///     }
/// }
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! impl_auto_register {
    ($($ty:ty),+ $(,)?) => {
        $(
            const _: () = {
                $crate::__macro_exports::auto_register::inventory::submit! {
                    $crate::__macro_exports::auto_register::__AutoRegisterFamily(
                        $crate::FamilyRegistry::register::<$ty>
                    )
                }
            };
        )+
    };
}

/// Submits [`Polymorphic`] types for [`FamilyRegistry::auto_register`].
///
/// Expands to nothing without the `auto_register` feature.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! impl_auto_register {
    ($($ty:ty),+ $(,)?) => {};
}
