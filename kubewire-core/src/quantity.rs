//! Opaque resource quantities
use std::fmt;

use crate::{
    codec::{Decode, Decoder, Encode, Encoder},
    error::{DecodeError, EncodeError},
    value::Value,
};

/// A resource quantity such as `500m`, `1Gi` or `2`.
///
/// The text is kept verbatim; no unit arithmetic is performed. Bare JSON numbers are
/// accepted and stored as their decimal text, matching what the apiserver accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(pub String);

impl Quantity {
    /// The quantity as written
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Quantity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Decode for Quantity {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(de.type_mismatch("quantity", &other)),
        }
    }
}

impl Encode for Quantity {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::String(self.0.clone()))
    }
}
