//! Flattening of multi-level family declarations.

use alloc::vec::Vec;

use crate::TypeHandle;
use crate::family::{DiscriminatorRule, FamilyMeta, FamilyRegistry};

/// Collects every rule reachable from `base`, depth-first, in declaration order.
///
/// Each directly registered rule is emitted, followed by the rules of the
/// family its target declares, if any. A target is not descended into when
/// its family is one of the families being flattened above it, which covers
/// re-declarations of `base`'s family and hierarchies that loop back.
///
/// A family reachable through several targets is flattened once per target,
/// so its rules are emitted again at each place it appears.
///
/// Returns an empty list if `base` does not participate.
///
/// # Examples
///
/// ```
/// use vc_polymorph::{FamilyRegistry, TypeHandle, collect, impl_polymorphic};
///
/// struct Shape;
/// struct Polygon;
/// struct Triangle;
///
/// impl_polymorphic!(Shape => [nested_literal(Polygon, "shapeType", "polygon")]);
/// impl_polymorphic!(Polygon => [literal(Triangle, "corners", "3")]);
///
/// let mut registry = FamilyRegistry::new();
/// registry.register::<Shape>();
///
/// let rules = collect(&registry, TypeHandle::of::<Shape>());
/// assert_eq!(rules.len(), 2);
/// assert!(rules[0].target().is::<Polygon>());
/// assert!(rules[1].target().is::<Triangle>());
/// ```
pub fn collect(registry: &FamilyRegistry, base: TypeHandle) -> Vec<DiscriminatorRule> {
    let Some(meta) = registry.get(base) else {
        return Vec::new();
    };

    let mut ancestors = Vec::from([base, meta.base()]);
    let mut rules = Vec::with_capacity(meta.rules().len());
    collect_into(registry, meta, &mut ancestors, &mut rules);
    rules
}

fn collect_into(
    registry: &FamilyRegistry,
    meta: &FamilyMeta,
    ancestors: &mut Vec<TypeHandle>,
    rules: &mut Vec<DiscriminatorRule>,
) {
    for rule in meta.rules() {
        rules.push(rule.clone());

        // A target without metadata is a leaf.
        let Some(nested) = registry.get(rule.target()) else {
            continue;
        };

        if ancestors.contains(&nested.base()) {
            log::trace!(
                "`{}` re-declares the family of `{}` it is flattened into",
                rule.target(),
                nested.base(),
            );
            continue;
        }

        ancestors.push(nested.base());
        collect_into(registry, nested, ancestors, rules);
        ancestors.pop();
    }
}

// -----------------------------------------------------------------------------
// Tests
