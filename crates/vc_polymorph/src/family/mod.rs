//! Declarations of polymorphic type families.
//!
//! - [`Discriminator`]: how a rule's discriminator value is chosen.
//! - [`DiscriminatorRule`]: one `(property, value) -> concrete type` mapping.
//! - [`FamilyMeta`]: the base type plus its directly registered rules.
//! - [`Polymorphic`]: the trait a type implements to supply its `FamilyMeta`.
//! - [`FamilyRegistry`]: the store of every participating type's `FamilyMeta`.

// -----------------------------------------------------------------------------
// Modules

mod meta;
mod registry;
mod rule;

// -----------------------------------------------------------------------------
// Exports

pub use meta::{FamilyMeta, Polymorphic};
pub use registry::FamilyRegistry;
pub use rule::{Discriminator, DiscriminatorRule};
