use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use std::sync::{LazyLock, PoisonError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::TypeHandle;
use crate::cache::{ResolutionCache, TypeTag};
use crate::document::Document;
use crate::error::PolymorphError;
use crate::family::{FamilyMeta, FamilyRegistry, Polymorphic};
use crate::utils::{TypeMap, new_map};

// -----------------------------------------------------------------------------
// Polymorph

static GLOBAL: LazyLock<Polymorph> = LazyLock::new(|| {
    let mut families = FamilyRegistry::new();
    families.auto_register();
    Polymorph::with_families(families)
});

/// Resolves concrete types from documents and writes their discriminators,
/// caching one [`ResolutionCache`] per base type.
///
/// Caches are built lazily, off-lock, from the [`FamilyRegistry`] and then
/// published whole; readers get an [`Arc`] snapshot and never observe a
/// partially built cache. No operation here fails: a base type without
/// metadata, a document without a matching discriminator and an unregistered
/// concrete type all degrade to pass-through behavior.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use vc_polymorph::{Polymorph, TypeHandle, impl_polymorphic};
///
/// struct Shape;
/// struct Circle;
/// struct Square;
///
/// impl_polymorphic!(Shape => [
///     literal(Circle, "shapeType", "circle"),
///     literal(Square, "shapeType", "square"),
/// ]);
///
/// let polymorph = Polymorph::new();
/// polymorph.register::<Shape>();
///
/// let mut document = HashMap::<String, String>::new();
/// document.insert("shapeType".into(), "circle".into());
/// assert!(polymorph.resolve::<Shape, _>(&document).is::<Circle>());
///
/// let mut written = HashMap::<String, String>::new();
/// polymorph.write::<Shape, Square, _>(&mut written);
/// assert_eq!(written["shapeType"], "square");
///
/// document.insert("shapeType".into(), "triangle".into());
/// assert!(polymorph.resolve::<Shape, _>(&document).is::<Shape>());
/// ```
pub struct Polymorph {
    families: RwLock<FamilyRegistry>,
    caches: RwLock<TypeMap<Arc<ResolutionCache>>>,
    // Bumped whenever the families may have changed, so a cache built from
    // stale metadata is never published.
    generation: AtomicU64,
}

impl Default for Polymorph {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Polymorph {
    /// Creates a manager over an empty [`FamilyRegistry`].
    #[inline]
    pub const fn new() -> Self {
        Self::with_families(FamilyRegistry::new())
    }

    /// Creates a manager over existing metadata.
    #[inline]
    pub const fn with_families(families: FamilyRegistry) -> Self {
        Self {
            families: RwLock::new(families),
            caches: RwLock::new(new_map()),
            generation: AtomicU64::new(0),
        }
    }

    /// The process-wide manager, for hosts that do not provide their own.
    ///
    /// Initialized with every family submitted through
    /// [`impl_auto_register!`](crate::impl_auto_register).
    #[inline]
    pub fn global() -> &'static Polymorph {
        &GLOBAL
    }

    // -------------------------------------------------------------------------
    // Metadata

    /// Takes a read lock on the underlying [`FamilyRegistry`].
    pub fn families(&self) -> RwLockReadGuard<'_, FamilyRegistry> {
        self.families.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`FamilyRegistry`].
    ///
    /// Published caches are left untouched; changes show up after
    /// [`invalidate`](Self::invalidate) or a forced [`cache_for`](Self::cache_for).
    pub fn families_mut(&self) -> RwLockWriteGuard<'_, FamilyRegistry> {
        let guard = self
            .families
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        guard
    }

    /// Registers `T` and the families nested below it.
    ///
    /// Registration only adds metadata, so published caches stay valid
    /// unless `T` was reachable but unregistered when they were built.
    /// Every cache is dropped regardless.
    pub fn register<T: Polymorphic>(&self) {
        self.families_mut().register::<T>();
        self.invalidate_all();
    }

    /// Replaces the metadata carried by `ty` and drops every cache.
    ///
    /// Nested families are flattened into their ancestors' caches, so any
    /// cache may depend on `ty`.
    pub fn set_family(&self, ty: TypeHandle, meta: FamilyMeta) -> Option<FamilyMeta> {
        let old = self.families_mut().insert(ty, meta);
        self.invalidate_all();
        old
    }

    /// Returns `true` if `base` carries metadata.
    #[inline]
    pub fn participates(&self, base: TypeHandle) -> bool {
        self.families().contains(base)
    }

    // -------------------------------------------------------------------------
    // Caches

    fn read_caches(&self) -> RwLockReadGuard<'_, TypeMap<Arc<ResolutionCache>>> {
        self.caches.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_caches(&self) -> RwLockWriteGuard<'_, TypeMap<Arc<ResolutionCache>>> {
        self.caches.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cache of `base`, building it on first access.
    ///
    /// With `force`, a fresh cache is built and replaces any published one.
    /// Concurrent callers for the same base type all end up with caches of
    /// identical content, whichever build gets published.
    pub fn cache_for(&self, base: TypeHandle, force: bool) -> Arc<ResolutionCache> {
        if !force && let Some(cache) = self.read_caches().get(&base) {
            return Arc::clone(cache);
        }

        loop {
            let (generation, built) = {
                let families = self.families();
                let generation = self.generation.load(Ordering::Acquire);
                (generation, ResolutionCache::build(&families, base))
            };

            let mut caches = self.write_caches();
            if self.generation.load(Ordering::Acquire) != generation {
                log::trace!("families changed while building `{base}`, rebuilding");
                continue;
            }
            if !force && let Some(published) = caches.get(&base) {
                return Arc::clone(published);
            }

            log::debug!(
                "{} resolution cache of `{base}`: {} types, {} properties",
                if force { "rebuilt" } else { "built" },
                built.len(),
                built.properties().len(),
            );
            let built = Arc::new(built);
            caches.insert(base, Arc::clone(&built));
            return built;
        }
    }

    /// [`cache_for`](Self::cache_for) the type `B`.
    #[inline]
    pub fn cache_of<B: ?Sized + 'static>(&self, force: bool) -> Arc<ResolutionCache> {
        self.cache_for(TypeHandle::of::<B>(), force)
    }

    /// Drops the cache of `base`; the next access rebuilds it.
    pub fn invalidate(&self, base: TypeHandle) {
        if self.write_caches().remove(&base).is_some() {
            log::debug!("invalidated resolution cache of `{base}`");
        }
    }

    /// [`invalidate`](Self::invalidate) the type `B`.
    #[inline]
    pub fn invalidate_type<B: ?Sized + 'static>(&self) {
        self.invalidate(TypeHandle::of::<B>());
    }

    /// Drops every cache.
    pub fn invalidate_all(&self) {
        let mut caches = self.write_caches();
        if !caches.is_empty() {
            log::debug!("invalidated {} resolution caches", caches.len());
            caches.clear();
        }
    }

    /// Returns `true` if a cache of `base` is published. Never builds.
    #[inline]
    pub fn is_cached(&self, base: TypeHandle) -> bool {
        self.read_caches().contains_key(&base)
    }

    /// The number of published caches.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.read_caches().len()
    }

    /// Builds, or fetches, the cache of `base` and fails on its first
    /// discriminator conflict.
    pub fn validate(&self, base: TypeHandle) -> Result<(), PolymorphError> {
        self.cache_for(base, false).check()
    }

    // -------------------------------------------------------------------------
    // Resolution

    /// Returns the concrete type `document` encodes, as a member of `base`'s family.
    ///
    /// Falls back to `base` itself when it does not participate or when no
    /// discriminator in the document matches.
    pub fn resolve_concrete_type<D: Document + ?Sized>(
        &self,
        base: TypeHandle,
        document: &D,
    ) -> TypeHandle {
        if !self.participates(base) {
            return base;
        }

        match self.cache_for(base, false).resolve(document) {
            Some(concrete) => concrete,
            None => {
                log::trace!("no discriminator of `{base}` matched, keeping the base type");
                base
            }
        }
    }

    /// [`resolve_concrete_type`](Self::resolve_concrete_type) against the type `B`.
    #[inline]
    pub fn resolve<B: ?Sized + 'static, D: Document + ?Sized>(&self, document: &D) -> TypeHandle {
        self.resolve_concrete_type(TypeHandle::of::<B>(), document)
    }

    /// Returns the discriminator written for `actual` when declared as `declared`.
    pub fn tag_for(&self, declared: TypeHandle, actual: TypeHandle) -> Option<TypeTag> {
        if !self.participates(declared) {
            return None;
        }
        self.cache_for(declared, false).tag_of(actual).cloned()
    }

    /// Writes the discriminator of `actual` into `document`.
    ///
    /// Does nothing when `declared` does not participate or when `actual`
    /// was never registered in its family.
    pub fn write_discriminator<D: Document + ?Sized>(
        &self,
        document: &mut D,
        declared: TypeHandle,
        actual: TypeHandle,
    ) {
        match self.tag_for(declared, actual) {
            Some(tag) => tag.write_to(document),
            None => log::trace!("`{actual}` has no discriminator in the family of `{declared}`"),
        }
    }

    /// [`write_discriminator`](Self::write_discriminator) for a `T` declared as `B`.
    #[inline]
    pub fn write<B: ?Sized + 'static, T: ?Sized + 'static, D: Document + ?Sized>(
        &self,
        document: &mut D,
    ) {
        self.write_discriminator(document, TypeHandle::of::<B>(), TypeHandle::of::<T>());
    }
}

impl core::fmt::Debug for Polymorph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Polymorph")
            .field("families", &*self.families())
            .field("cached", &self.cached_len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
