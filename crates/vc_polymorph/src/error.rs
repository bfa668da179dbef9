use alloc::string::String;

use thiserror::Error;

use crate::TypeHandle;

// -----------------------------------------------------------------------------
// Error

/// Failures of the opt-in strict checks and of the JSON bridge.
///
/// Resolution and discriminator writing never fail: unregistered or unmatched
/// types fall back to pass-through behavior.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolymorphError {
    #[error(
        "discriminator `{property}` = `{literal}` maps to both `{shadowed}` and `{winner}`, `{winner}` wins"
    )]
    Conflict {
        property: String,
        literal: String,
        shadowed: TypeHandle,
        winner: TypeHandle,
    },

    #[error("cannot write the discriminator of `{0}` into a document that is not an object")]
    NotAnObject(TypeHandle),

    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
