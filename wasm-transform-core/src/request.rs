//! Request descriptor model
//!
//! The host serializes its request as JSON text, typically
//! `{"url": .., "method": .., "headers": {..}, "payload": ..}`. The guest only
//! reads the fields it needs and carries everything else through untouched.

use crate::error::DecodeError;
use serde_json::{Map, Value};
use std::fmt;

/// A decoded request descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDocument {
    root: Value,
}

impl RequestDocument {
    /// Parse descriptor bytes
    ///
    /// Any well-formed JSON is accepted. A non-object top level simply has no
    /// children.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let root = serde_json::from_slice(bytes)?;
        Ok(Self { root })
    }

    /// Serialize back to compact UTF-8 JSON
    pub fn encode(&self) -> Vec<u8> {
        self.root.to_string().into_bytes()
    }

    /// Look up an object-valued child
    ///
    /// Returns `None` when the key is missing or when its value is not an
    /// object.
    pub fn get_child(&mut self, key: &str) -> Option<ObjectNode<'_>> {
        match self.root.get_mut(key) {
            Some(Value::Object(fields)) => Some(ObjectNode { fields }),
            _ => None,
        }
    }

    /// View the top level as an object, if it is one
    pub fn root(&mut self) -> Option<ObjectNode<'_>> {
        match &mut self.root {
            Value::Object(fields) => Some(ObjectNode { fields }),
            _ => None,
        }
    }

    /// Read a top-level string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    /// Borrow the underlying value
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Take the underlying value
    pub fn into_value(self) -> Value {
        self.root
    }
}

impl From<Value> for RequestDocument {
    fn from(root: Value) -> Self {
        Self { root }
    }
}

impl fmt::Display for RequestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Mutable view of an object inside a [`RequestDocument`]
#[derive(Debug)]
pub struct ObjectNode<'a> {
    fields: &'a mut Map<String, Value>,
}

impl ObjectNode<'_> {
    /// Insert or overwrite a string field; keys compare exactly
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), Value::String(value.into()));
    }

    /// Read a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Check whether a field exists
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the object has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a nested object-valued field
    pub fn get_child(&mut self, key: &str) -> Option<ObjectNode<'_>> {
        match self.fields.get_mut(key) {
            Some(Value::Object(fields)) => Some(ObjectNode { fields }),
            _ => None,
        }
    }
}
