//! Items used by the exported macros. Not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::FamilyRegistry;

    pub struct __AutoRegisterFamily(pub fn(&mut FamilyRegistry));

    inventory::collect!(__AutoRegisterFamily);

    // Always submitted, so `register_all` can tell whether the platform
    // supports static registration at all.
    inventory::submit! {
        __AutoRegisterFamily(FamilyRegistry::mark_auto_registered)
    }

    pub(crate) fn register_all(registry: &mut FamilyRegistry) {
        let mut count = 0_usize;
        for entry in inventory::iter::<__AutoRegisterFamily> {
            (entry.0)(registry);
            count += 1;
        }
        log::debug!("auto registration visited {count} submissions");
    }
}
