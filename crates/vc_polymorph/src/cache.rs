use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::TypeHandle;
use crate::collect::collect;
use crate::document::Document;
use crate::error::PolymorphError;
use crate::family::{DiscriminatorRule, FamilyRegistry};
use crate::utils::{HashMap, TypeMap, new_map};

// -----------------------------------------------------------------------------
// TypeTag

/// The discriminator written for one concrete type: a property and its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeTag {
    property: Cow<'static, str>,
    literal: Cow<'static, str>,
}

impl TypeTag {
    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Writes the tag into `document`.
    #[inline]
    pub fn write_to<D: Document + ?Sized>(&self, document: &mut D) {
        document.set_str(&self.property, &self.literal);
    }
}

// -----------------------------------------------------------------------------
// DiscriminatorConflict

/// Two rules claiming the same `(property, literal)` pair for different types.
///
/// The later rule wins; the conflict is only recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscriminatorConflict {
    pub property: Cow<'static, str>,
    pub literal: Cow<'static, str>,
    /// The type the pair resolved to before being overwritten.
    pub shadowed: TypeHandle,
    /// The type the pair resolves to.
    pub winner: TypeHandle,
}

impl From<&DiscriminatorConflict> for PolymorphError {
    fn from(conflict: &DiscriminatorConflict) -> Self {
        PolymorphError::Conflict {
            property: conflict.property.clone().into_owned(),
            literal: conflict.literal.clone().into_owned(),
            shadowed: conflict.shadowed,
            winner: conflict.winner,
        }
    }
}

// -----------------------------------------------------------------------------
// ResolutionCache

#[derive(Clone, Debug, PartialEq, Eq)]
struct PropertyIndex {
    property: Cow<'static, str>,
    values: HashMap<Cow<'static, str>, TypeHandle>,
}

/// The flattened lookup structure of one base type.
///
/// Built once from [`collect`], then only read:
/// - the deserialization index maps a property and a value to a concrete type;
///   properties are kept in the order they first appear in the rule list,
///   which is the order [`resolve`](Self::resolve) probes them in.
/// - the serialization index maps a concrete type to its [`TypeTag`].
///
/// Both indices are last-write-wins. Shadowed deserialization entries are kept
/// as [`DiscriminatorConflict`]s, see [`check`](Self::check).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionCache {
    base: TypeHandle,
    deserialization: Vec<PropertyIndex>,
    serialization: TypeMap<TypeTag>,
    conflicts: Vec<DiscriminatorConflict>,
}

impl ResolutionCache {
    /// Creates a cache holding no rule.
    pub const fn empty(base: TypeHandle) -> Self {
        Self {
            base,
            deserialization: Vec::new(),
            serialization: new_map(),
            conflicts: Vec::new(),
        }
    }

    /// Builds the cache of `base` from the rules reachable in `registry`.
    ///
    /// Pure: the registry is only read, and the result is not published anywhere.
    pub fn build(registry: &FamilyRegistry, base: TypeHandle) -> Self {
        Self::from_rules(base, &collect(registry, base))
    }

    /// Builds a cache from an already flattened rule list.
    pub fn from_rules(base: TypeHandle, rules: &[DiscriminatorRule]) -> Self {
        let mut cache = Self::empty(base);
        for rule in rules {
            cache.insert(rule);
        }
        cache
    }

    fn insert(&mut self, rule: &DiscriminatorRule) {
        let literal = rule.kind().value_cow();

        let index = match self
            .deserialization
            .iter()
            .position(|index| index.property == rule.property())
        {
            Some(position) => &mut self.deserialization[position],
            None => {
                self.deserialization.push(PropertyIndex {
                    property: rule.property_cow().clone(),
                    values: new_map(),
                });
                let last = self.deserialization.len() - 1;
                &mut self.deserialization[last]
            }
        };

        if let Some(shadowed) = index.values.insert(literal.clone(), rule.target())
            && shadowed != rule.target()
        {
            log::warn!(
                "discriminator `{}` = `{}` of family `{}` now maps to `{}`, shadowing `{}`",
                rule.property(),
                literal,
                self.base,
                rule.target(),
                shadowed,
            );
            self.conflicts.push(DiscriminatorConflict {
                property: rule.property_cow().clone(),
                literal: literal.clone(),
                shadowed,
                winner: rule.target(),
            });
        }

        self.serialization.insert(
            rule.target(),
            TypeTag {
                property: rule.property_cow().clone(),
                literal: literal.clone(),
            },
        );
    }

    /// The base type this cache was built for.
    #[inline(always)]
    pub const fn base(&self) -> TypeHandle {
        self.base
    }

    /// Returns the type registered under `property` = `literal`.
    pub fn lookup(&self, property: &str, literal: &str) -> Option<TypeHandle> {
        self.deserialization
            .iter()
            .find(|index| index.property == property)
            .and_then(|index| index.values.get(literal).copied())
    }

    /// Returns the concrete type encoded by `document`, if any discriminator matches.
    ///
    /// Properties are probed in first-declaration order; the first one present
    /// in the document with a registered value wins.
    pub fn resolve<D: Document + ?Sized>(&self, document: &D) -> Option<TypeHandle> {
        self.deserialization.iter().find_map(|index| {
            let value = document.get_str(&index.property)?;
            index.values.get(value).copied()
        })
    }

    /// Returns the discriminator written for exactly `ty`.
    #[inline]
    pub fn tag_of(&self, ty: TypeHandle) -> Option<&TypeTag> {
        self.serialization.get(&ty)
    }

    /// The discriminator properties, in probing order.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = &str> {
        self.deserialization.iter().map(|index| &*index.property)
    }

    /// The number of distinct concrete types this cache can write.
    #[inline]
    pub fn len(&self) -> usize {
        self.serialization.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.serialization.is_empty()
    }

    /// The shadowed `(property, literal)` pairs met while building.
    #[inline]
    pub fn conflicts(&self) -> &[DiscriminatorConflict] {
        &self.conflicts
    }

    /// Fails with the first recorded conflict, for callers requiring every
    /// `(property, literal)` pair to be unique.
    pub fn check(&self) -> Result<(), PolymorphError> {
        match self.conflicts.first() {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
