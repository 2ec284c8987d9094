use serde::Deserialize;

use super::{DecodeOptions, EncodeOptions};
use crate::{
    error::{DecodeError, EncodeError},
    value::{sort_keys, Value},
};

/// Wire serialization format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// `application/json`
    #[default]
    Json,
    /// `application/yaml`
    Yaml,
}

impl Format {
    /// Media type used in `Content-Type` and `Accept` headers
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Nesting of maps and sequences the YAML parser accepts, whatever the options say.
pub const YAML_NESTING_LIMIT: usize = 128;

enum Failure {
    Depth(usize),
    Syntax(String),
}

// serde_yaml reports its nesting guard through the error message only.
fn classify_yaml(message: String) -> Failure {
    if message.contains("recursion limit exceeded") {
        Failure::Depth(YAML_NESTING_LIMIT)
    } else {
        Failure::Syntax(message)
    }
}

// Containers allowed around the object levels `max_depth` permits: one map or sequence
// between each pair of object levels, plus opaque values at the leaves.
fn nesting_limit(options: &DecodeOptions) -> usize {
    options.max_depth.saturating_mul(2).max(YAML_NESTING_LIMIT)
}

// Bracket nesting of a JSON document, given up on once it passes `limit`.
// Keeps the unbounded parser below from recursing past what the decoder would accept.
fn json_nesting_within(bytes: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return false;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    true
}

fn parse_json(bytes: &[u8], options: &DecodeOptions) -> Result<Value, Failure> {
    let limit = nesting_limit(options);
    if !json_nesting_within(bytes, limit) {
        return Err(Failure::Depth(limit));
    }
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de).map_err(|err| Failure::Syntax(err.to_string()))?;
    de.end().map_err(|err| Failure::Syntax(err.to_string()))?;
    Ok(value)
}

fn parse_as(format: Format, bytes: &[u8], options: &DecodeOptions) -> Result<Value, Failure> {
    match format {
        Format::Json => parse_json(bytes, options),
        Format::Yaml => serde_yaml::from_slice(bytes).map_err(|err| classify_yaml(err.to_string())),
    }
}

fn depth_exceeded(limit: usize) -> DecodeError {
    tracing::debug!(limit, "parser nesting limit reached");
    DecodeError::DepthExceeded {
        field: "<root>".into(),
        limit,
    }
}

pub(super) fn parse(bytes: &[u8], options: &DecodeOptions) -> Result<Value, DecodeError> {
    if let Some(format) = options.format {
        return parse_as(format, bytes, options).map_err(|failure| match failure {
            Failure::Depth(limit) => depth_exceeded(limit),
            Failure::Syntax(reason) => DecodeError::UnknownFormat {
                expected: format.name(),
                reason,
            },
        });
    }

    let json_reason = match parse_as(Format::Json, bytes, options) {
        Ok(value) => return Ok(value),
        Err(Failure::Depth(limit)) => return Err(depth_exceeded(limit)),
        Err(Failure::Syntax(reason)) => reason,
    };
    tracing::trace!(%json_reason, "input is not JSON, trying YAML");
    match parse_as(Format::Yaml, bytes, options) {
        Ok(value) => Ok(value),
        Err(Failure::Depth(limit)) => Err(depth_exceeded(limit)),
        Err(Failure::Syntax(yaml_reason)) => Err(DecodeError::UnknownFormat {
            expected: "JSON or YAML",
            reason: format!("json: {json_reason}; yaml: {yaml_reason}"),
        }),
    }
}

pub(super) fn parse_yaml_documents(bytes: &[u8]) -> Result<Vec<Value>, DecodeError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        let value = Value::deserialize(document).map_err(|err| match classify_yaml(err.to_string()) {
            Failure::Depth(limit) => depth_exceeded(limit),
            Failure::Syntax(reason) => DecodeError::UnknownFormat {
                expected: "YAML",
                reason,
            },
        })?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

pub(super) fn write(mut value: Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    if options.sorted_keys {
        sort_keys(&mut value);
    }
    match options.format {
        Format::Json if options.pretty => serde_json::to_vec_pretty(&value).map_err(EncodeError::Json),
        Format::Json => serde_json::to_vec(&value).map_err(EncodeError::Json),
        Format::Yaml => serde_yaml::to_string(&value)
            .map(String::into_bytes)
            .map_err(EncodeError::Yaml),
    }
}
