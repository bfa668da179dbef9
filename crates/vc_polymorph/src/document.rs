use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::hash::BuildHasher;

// -----------------------------------------------------------------------------
// Document

/// A string-keyed view over the single record being read or written.
///
/// Only discriminator fields go through this trait; every other field is
/// the business of whatever maps the record to and from values. The wire
/// format behind it is irrelevant here.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use vc_polymorph::Document;
///
/// let mut record = HashMap::<String, String>::new();
/// record.set_str("shapeType", "circle");
/// assert_eq!(record.get_str("shapeType"), Some("circle"));
/// assert_eq!(record.get_str("radius"), None);
/// ```
pub trait Document {
    /// Returns the string stored at `key`.
    ///
    /// A missing field and a field holding a non-string value both read as `None`.
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Stores `value` as a string at `key`, replacing any previous value.
    fn set_str(&mut self, key: &str, value: &str);
}

impl<D: Document + ?Sized> Document for &mut D {
    #[inline]
    fn get_str(&self, key: &str) -> Option<&str> {
        (**self).get_str(key)
    }

    #[inline]
    fn set_str(&mut self, key: &str, value: &str) {
        (**self).set_str(key, value);
    }
}

impl<S: BuildHasher> Document for std::collections::HashMap<String, String, S> {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }
}

impl Document for BTreeMap<String, String> {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }
}

// -----------------------------------------------------------------------------
// Tests
