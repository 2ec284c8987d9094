//! Values that are either an integer or a string
use std::fmt;

use thiserror::Error;

use crate::{
    codec::{decode_union, Alternative, Decode, Decoder, Encode, Encoder, Shape, Union},
    error::{DecodeError, EncodeError},
    value::Value,
};

/// A field that holds either an int32 or a string, such as `maxSurge: 25%` or a
/// named container port.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntOrString {
    /// An integer value
    Int(i32),
    /// A string value, commonly a percentage or a port name
    String(String),
}

impl Default for IntOrString {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<i32> for IntOrString {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for IntOrString {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A string [`IntOrString`] that is not a percentage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value {0:?} for IntOrString: not an integer percentage")]
pub struct NotAPercentage(pub String);

impl IntOrString {
    /// Resolve against `total`, treating strings as `N%` of it.
    ///
    /// Fractional results round up when `round_up` is set and down otherwise, as
    /// rolling update surge and unavailability budgets do.
    pub fn scaled_value(&self, total: i32, round_up: bool) -> Result<i32, NotAPercentage> {
        let percent = match self {
            Self::Int(n) => return Ok(*n),
            Self::String(s) => s
                .strip_suffix('%')
                .and_then(|digits| digits.parse::<i32>().ok())
                .ok_or_else(|| NotAPercentage(s.clone()))?,
        };
        let scaled = f64::from(percent) * f64::from(total) / 100.0;
        let rounded = if round_up { scaled.ceil() } else { scaled.floor() };
        Ok(rounded as i32)
    }
}

impl Union for IntOrString {
    const NAME: &'static str = "IntOrString";

    fn alternatives() -> &'static [Alternative<Self>] {
        const ALTERNATIVES: &[Alternative<IntOrString>] = &[
            Alternative {
                shape: Shape::Integer,
                decode: |value, de| i32::decode(value, de).map(IntOrString::Int),
            },
            Alternative {
                shape: Shape::String,
                decode: |value, de| String::decode(value, de).map(IntOrString::String),
            },
        ];
        ALTERNATIVES
    }
}

impl Decode for IntOrString {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        decode_union(value, de)
    }
}

impl Encode for IntOrString {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        match self {
            Self::Int(n) => n.encode(en),
            Self::String(s) => s.encode(en),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{from_value, to_value},
        value::ValueKind,
    };
    use serde_json::json;

    #[test]
    fn dispatches_on_shape() {
        assert_eq!(from_value::<IntOrString>(json!(3)).unwrap(), IntOrString::Int(3));
        assert_eq!(
            from_value::<IntOrString>(json!("25%")).unwrap(),
            IntOrString::String("25%".into())
        );
        assert_eq!(to_value(&IntOrString::Int(3)).unwrap(), json!(3));
        assert_eq!(to_value(&IntOrString::from("http")).unwrap(), json!("http"));
    }

    #[test]
    fn rejects_other_shapes() {
        let err = from_value::<IntOrString>(json!(true)).unwrap_err();
        assert_eq!(err, DecodeError::UnionNoMatch {
            field: "<root>".into(),
            union: "IntOrString",
            actual: ValueKind::Bool,
        });
        // floats do not have the integer shape
        assert!(from_value::<IntOrString>(json!(1.5)).is_err());
    }

    #[test]
    fn out_of_range_integer_is_a_type_mismatch() {
        let err = from_value::<IntOrString>(json!(1_i64 << 40)).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { expected: "int32", .. }));
    }

    #[test]
    fn percentages_scale() {
        let surge = IntOrString::from("25%");
        assert_eq!(surge.scaled_value(10, true), Ok(3));
        assert_eq!(surge.scaled_value(10, false), Ok(2));
        assert_eq!(IntOrString::Int(4).scaled_value(10, true), Ok(4));
        assert!(IntOrString::from("http").scaled_value(10, true).is_err());
    }
}
