//! Cachable items
//!
//! Anything that can name its cache file and produce the bytes to store
//! in it can be handed to a [`Cacher`](super::Cacher).

use std::sync::Arc;

use serde::Serialize;

/// An item that knows its cache file name and how to serialize itself
pub trait Cachable {
    /// File name of the item inside the cache directory
    fn file_name(&self) -> String;

    /// Produce the bytes to write
    ///
    /// Called once, on the cache worker, when the write is executed.
    fn transform(&self) -> Vec<u8>;
}

impl<T: Cachable + ?Sized> Cachable for Arc<T> {
    fn file_name(&self) -> String {
        (**self).file_name()
    }

    fn transform(&self) -> Vec<u8> {
        (**self).transform()
    }
}

impl<T: Cachable + ?Sized> Cachable for Box<T> {
    fn file_name(&self) -> String {
        (**self).file_name()
    }

    fn transform(&self) -> Vec<u8> {
        (**self).transform()
    }
}

/// A serde value stored as a JSON document
///
/// Encoding happens up front so serialization errors reach the caller
/// before anything is queued.
#[derive(Debug, Clone)]
pub struct JsonItem {
    file_name: String,
    body: Vec<u8>,
}

impl JsonItem {
    /// Encode `value` as compact JSON
    pub fn new<T: Serialize + ?Sized>(
        file_name: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            file_name: file_name.into(),
            body: serde_json::to_vec(value)?,
        })
    }

    /// Encode `value` as indented JSON
    pub fn pretty<T: Serialize + ?Sized>(
        file_name: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            file_name: file_name.into(),
            body: serde_json::to_vec_pretty(value)?,
        })
    }
}

impl Cachable for JsonItem {
    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    fn transform(&self) -> Vec<u8> {
        self.body.clone()
    }
}
