//! [`Document`] support for `serde_json`, and helpers that tag serialized values.
//!
//! Requires the `json` feature.
//!
//! # Examples
//!
//! ```
//! use vc_polymorph::{Polymorph, impl_polymorphic, json};
//!
//! struct Shape;
//!
//! #[derive(serde::Serialize)]
//! struct Circle {
//!     radius: u32,
//! }
//!
//! impl_polymorphic!(Shape => [literal(Circle, "shapeType", "circle")]);
//!
//! let polymorph = Polymorph::new();
//! polymorph.register::<Shape>();
//!
//! let value = json::to_document::<Shape, _>(&polymorph, &Circle { radius: 5 }).unwrap();
//! assert_eq!(value, serde_json::json!({ "shapeType": "circle", "radius": 5 }));
//!
//! assert!(json::resolve_value::<Shape>(&polymorph, &value).is::<Circle>());
//! ```

use alloc::borrow::ToOwned;
use alloc::string::String;

use serde_core::Serialize;
use serde_json::{Map, Value};

use crate::TypeHandle;
use crate::document::Document;
use crate::error::PolymorphError;
use crate::polymorph::Polymorph;

impl Document for Map<String, Value> {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), Value::String(value.to_owned()));
    }
}

/// Only objects hold fields: any other value reads as empty and ignores writes.
impl Document for Value {
    fn get_str(&self, key: &str) -> Option<&str> {
        match self {
            Value::Object(map) => map.get_str(key),
            _ => None,
        }
    }

    fn set_str(&mut self, key: &str, value: &str) {
        if let Value::Object(map) = self {
            map.set_str(key, value);
        }
    }
}

/// Serializes `value` and writes its discriminator as a member of `B`'s family.
///
/// Fails if serialization fails, or if a discriminator is due but `value`
/// does not serialize to an object.
pub fn to_document<B, T>(polymorph: &Polymorph, value: &T) -> Result<Value, PolymorphError>
where
    B: ?Sized + 'static,
    T: Serialize + 'static,
{
    let mut document = serde_json::to_value(value)?;
    let actual = TypeHandle::of::<T>();

    if let Some(tag) = polymorph.tag_for(TypeHandle::of::<B>(), actual) {
        match &mut document {
            Value::Object(map) => tag.write_to(map),
            _ => return Err(PolymorphError::NotAnObject(actual)),
        }
    }
    Ok(document)
}

/// Resolves the concrete member of `B`'s family that `value` encodes.
#[inline]
pub fn resolve_value<B: ?Sized + 'static>(polymorph: &Polymorph, value: &Value) -> TypeHandle {
    polymorph.resolve::<B, _>(value)
}

// -----------------------------------------------------------------------------
// Tests
