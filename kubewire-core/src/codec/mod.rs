//! The typed schema codec.
//!
//! Conversion happens in two steps. Wire bytes are parsed into a [`Value`] tree by
//! [`serde_json`] or [`serde_yaml`], then a [`Decode`] implementation walks that tree into
//! a typed object, consulting the type's static [`Field`] table for wire keys. Encoding
//! runs the same tables in reverse and only emits populated slots.
//!
//! ```
//! use kubewire_core::{codec, wire_object};
//!
//! wire_object! {
//!     /// A toy object
//!     #[derive(Clone, Debug, Default, PartialEq)]
//!     pub struct Toy {
//!         /// Number of replicas
//!         replicas: i32 = "replicas",
//!         /// Reference to another schema
//!         reference: String = "$ref",
//!     }
//! }
//!
//! let toy: Toy = codec::from_slice(br##"{"replicas": 0, "$ref": "#/definitions/x"}"##).unwrap();
//! assert_eq!(toy.replicas, Some(0));
//! assert_eq!(codec::to_string(&toy).unwrap(), r##"{"replicas":0,"$ref":"#/definitions/x"}"##);
//! ```
use std::fmt;

use crate::{
    error::{DecodeError, EncodeError},
    value::{Value, ValueKind},
};

mod format;
mod object;
mod primitive;
mod union;

pub use format::{Format, YAML_NESTING_LIMIT};
pub use object::{decode_object, encode_object, Field, Object};
pub use union::{decode_union, Alternative, Shape, Union};

/// Nesting limit used when no explicit [`DecodeOptions::max_depth`] is configured.
pub const DEFAULT_MAX_DEPTH: usize = 48;

/// A type that can be built from a parsed wire value.
pub trait Decode: Sized {
    /// Decode `value`, reporting failures relative to the decoder's current field path.
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError>;
}

/// A type that can be written as a wire value.
pub trait Encode {
    /// Encode `self`, reporting failures relative to the encoder's current field path.
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError>;
}

/// Options for a decode call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Object nesting at which decoding is refused.
    ///
    /// A document whose objects nest `N` levels deep decodes when `N < max_depth`
    /// and fails with [`DecodeError::DepthExceeded`] otherwise.
    ///
    /// Before decoding, JSON input may nest maps and sequences up to twice this value
    /// (at least [`YAML_NESTING_LIMIT`]). YAML input is always capped at
    /// [`YAML_NESTING_LIMIT`] maps and sequences by its parser. Both cases report the
    /// nesting limit that was hit.
    pub max_depth: usize,

    /// Force a wire format instead of detecting it.
    pub format: Option<Format>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            format: None,
        }
    }
}

impl DecodeOptions {
    /// Set the nesting limit
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Only accept input in the given format
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// Options for an encode call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Output format
    pub format: Format,
    /// Order every object's keys alphabetically instead of by declaration
    pub sorted_keys: bool,
    /// Indent JSON output (YAML is always block formatted)
    pub pretty: bool,
}

impl EncodeOptions {
    /// Write the given format
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sort keys for reproducible output
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.sorted_keys = true;
        self
    }

    /// Indent JSON output
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

#[derive(Clone, Debug)]
enum Segment {
    Field(&'static str),
    Key(String),
    Index(usize),
}

/// Location inside the document being processed
#[derive(Clone, Debug, Default)]
struct FieldPath(Vec<Segment>);

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Decode state threaded through every [`Decode`] call.
///
/// Tracks the field path for error reporting and the object nesting depth.
#[derive(Debug)]
pub struct Decoder {
    max_depth: usize,
    depth: usize,
    path: FieldPath,
}

impl Decoder {
    /// A decoder positioned at the document root
    pub fn new(options: &DecodeOptions) -> Self {
        Self {
            max_depth: options.max_depth,
            depth: 0,
            path: FieldPath::default(),
        }
    }

    fn scoped<T: Decode>(&mut self, segment: Segment, value: Value) -> Result<T, DecodeError> {
        self.path.0.push(segment);
        let result = T::decode(value, self);
        self.path.0.pop();
        result
    }

    /// Decode the value of a named field
    pub fn field<T: Decode>(&mut self, key: &'static str, value: Value) -> Result<T, DecodeError> {
        self.scoped(Segment::Field(key), value)
    }

    /// Decode one element of a sequence
    pub fn element<T: Decode>(&mut self, index: usize, value: Value) -> Result<T, DecodeError> {
        self.scoped(Segment::Index(index), value)
    }

    /// Decode the value stored under a map key
    pub fn entry<T: Decode>(&mut self, key: &str, value: Value) -> Result<T, DecodeError> {
        self.scoped(Segment::Key(key.to_owned()), value)
    }

    /// Run `f` one object level deeper, enforcing the depth limit.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, DecodeError>) -> Result<T, DecodeError> {
        self.depth += 1;
        if self.depth >= self.max_depth {
            self.depth -= 1;
            tracing::debug!(field = %self.path, limit = self.max_depth, "decode depth limit reached");
            return Err(DecodeError::DepthExceeded {
                field: self.path.to_string(),
                limit: self.max_depth,
            });
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Current object nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current field path in Kubernetes notation
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    /// A [`DecodeError::TypeMismatch`] at the current path
    pub fn type_mismatch(&self, expected: &'static str, actual: &Value) -> DecodeError {
        DecodeError::TypeMismatch {
            field: self.path(),
            expected,
            actual: ValueKind::of(actual),
        }
    }

    /// A [`DecodeError::UnionNoMatch`] at the current path
    pub fn union_mismatch(&self, union: &'static str, actual: &Value) -> DecodeError {
        DecodeError::UnionNoMatch {
            field: self.path(),
            union,
            actual: ValueKind::of(actual),
        }
    }

    /// A [`DecodeError::InvalidValue`] at the current path
    pub fn invalid_value(&self, reason: impl fmt::Display) -> DecodeError {
        DecodeError::InvalidValue {
            field: self.path(),
            reason: reason.to_string(),
        }
    }
}

/// Encode state threaded through every [`Encode`] call.
#[derive(Debug, Default)]
pub struct Encoder {
    path: FieldPath,
}

impl Encoder {
    /// An encoder positioned at the document root
    pub fn new() -> Self {
        Self::default()
    }

    fn scoped<T: Encode + ?Sized>(&mut self, segment: Segment, value: &T) -> Result<Value, EncodeError> {
        self.path.0.push(segment);
        let result = value.encode(self);
        self.path.0.pop();
        result
    }

    /// Encode the value of a named field
    pub fn field<T: Encode + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<Value, EncodeError> {
        self.scoped(Segment::Field(key), value)
    }

    /// Encode one element of a sequence
    pub fn element<T: Encode + ?Sized>(&mut self, index: usize, value: &T) -> Result<Value, EncodeError> {
        self.scoped(Segment::Index(index), value)
    }

    /// Encode the value stored under a map key
    pub fn entry<T: Encode + ?Sized>(&mut self, key: &str, value: &T) -> Result<Value, EncodeError> {
        self.scoped(Segment::Key(key.to_owned()), value)
    }

    /// A [`EncodeError::NonFiniteNumber`] at the current path
    pub fn non_finite(&self) -> EncodeError {
        EncodeError::NonFiniteNumber {
            field: self.path.to_string(),
        }
    }
}

/// Decode a parsed value with default options
pub fn from_value<T: Decode>(value: Value) -> Result<T, DecodeError> {
    from_value_with(value, &DecodeOptions::default())
}

/// Decode a parsed value
pub fn from_value_with<T: Decode>(value: Value, options: &DecodeOptions) -> Result<T, DecodeError> {
    let mut de = Decoder::new(options);
    T::decode(value, &mut de)
}

/// Decode JSON or YAML bytes with default options
pub fn from_slice<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    from_slice_with(bytes, &DecodeOptions::default())
}

/// Decode JSON or YAML bytes
pub fn from_slice_with<T: Decode>(bytes: &[u8], options: &DecodeOptions) -> Result<T, DecodeError> {
    let value = format::parse(bytes, options)?;
    from_value_with(value, options)
}

/// Decode a JSON or YAML string with default options
pub fn from_str<T: Decode>(text: &str) -> Result<T, DecodeError> {
    from_slice(text.as_bytes())
}

/// Decode every document of a multi-document YAML stream.
///
/// Empty documents (a bare `---`) are skipped.
pub fn from_yaml_documents<T: Decode>(bytes: &[u8], options: &DecodeOptions) -> Result<Vec<T>, DecodeError> {
    format::parse_yaml_documents(bytes)?
        .into_iter()
        .map(|document| from_value_with(document, options))
        .collect()
}

/// Encode into a value tree
pub fn to_value<T: Encode + ?Sized>(object: &T) -> Result<Value, EncodeError> {
    object.encode(&mut Encoder::new())
}

/// Encode as compact JSON
pub fn to_vec<T: Encode + ?Sized>(object: &T) -> Result<Vec<u8>, EncodeError> {
    to_vec_with(object, &EncodeOptions::default())
}

/// Encode with explicit options
pub fn to_vec_with<T: Encode + ?Sized>(object: &T, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    format::write(to_value(object)?, options)
}

/// Encode as a compact JSON string
pub fn to_string<T: Encode + ?Sized>(object: &T) -> Result<String, EncodeError> {
    serde_json::to_string(&to_value(object)?).map_err(EncodeError::Json)
}

/// Encode as a YAML document
pub fn to_yaml_string<T: Encode + ?Sized>(object: &T) -> Result<String, EncodeError> {
    serde_yaml::to_string(&to_value(object)?).map_err(EncodeError::Yaml)
}
