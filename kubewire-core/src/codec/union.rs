use super::Decoder;
use crate::{
    error::DecodeError,
    value::{Value, ValueKind},
};

/// Coarse shape of a wire value, used to pick a union alternative
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `true` or `false`
    Bool,
    /// A number without a fractional part
    Integer,
    /// Any number
    Number,
    /// A string
    String,
    /// A sequence
    Array,
    /// A map
    Object,
}

impl Shape {
    /// Whether `value` has this shape
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, ValueKind::of(value)),
            (Self::Bool, ValueKind::Bool)
                | (Self::Integer, ValueKind::Integer)
                | (Self::Number, ValueKind::Integer | ValueKind::Float)
                | (Self::String, ValueKind::String)
                | (Self::Array, ValueKind::Array)
                | (Self::Object, ValueKind::Object)
        )
    }
}

/// One arm of a union
pub struct Alternative<U> {
    /// Values of this shape are routed to this arm
    pub shape: Shape,
    /// Decode the value into the arm
    pub decode: fn(Value, &mut Decoder) -> Result<U, DecodeError>,
}

/// A field that holds exactly one of several alternatives.
pub trait Union: Sized + 'static {
    /// Type name used in error messages
    const NAME: &'static str;

    /// The arms, highest priority first
    fn alternatives() -> &'static [Alternative<Self>];
}

/// Decode with the first alternative whose shape matches.
pub fn decode_union<U: Union>(value: Value, de: &mut Decoder) -> Result<U, DecodeError> {
    match U::alternatives().iter().find(|alt| alt.shape.matches(&value)) {
        Some(alt) => (alt.decode)(value, de),
        None => Err(de.union_mismatch(U::NAME, &value)),
    }
}
