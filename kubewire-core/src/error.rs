use crate::value::ValueKind;
use thiserror::Error;

/// Failure to turn wire bytes or a parsed value into a typed object.
///
/// Every variant that concerns a specific value carries the field path where decoding
/// stopped, in the notation the apiserver uses for validation errors
/// (`spec.template.spec.containers[0].image`, `metadata.labels[app]`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The wire value's kind disagrees with the declared field type.
    #[error("{field}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Path of the offending field
        field: String,
        /// Declared type of the field
        expected: &'static str,
        /// Kind of the value found on the wire
        actual: ValueKind,
    },

    /// No alternative of a union field accepts the wire value's shape.
    #[error("{field}: {actual} does not match any alternative of {union}")]
    UnionNoMatch {
        /// Path of the offending field
        field: String,
        /// Name of the union type
        union: &'static str,
        /// Kind of the value found on the wire
        actual: ValueKind,
    },

    /// The document nests objects at or beyond the configured depth limit.
    #[error("{field}: nesting depth limit of {limit} reached")]
    DepthExceeded {
        /// Path of the object that tripped the guard
        field: String,
        /// The configured limit
        limit: usize,
    },

    /// The input is neither valid JSON nor valid YAML for the requested decode.
    #[error("input is not valid {expected}: {reason}")]
    UnknownFormat {
        /// Formats that were attempted
        expected: &'static str,
        /// Parser diagnostics
        reason: String,
    },

    /// The wire value has the right kind but content that cannot be interpreted.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Path of the offending field
        field: String,
        /// What was wrong with the value
        reason: String,
    },
}

/// Failure to turn a typed object into wire bytes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EncodeError {
    /// JSON has no representation for NaN or infinite numbers.
    #[error("{field}: cannot encode non-finite number")]
    NonFiniteNumber {
        /// Path of the offending field
        field: String,
    },

    /// Writing JSON output failed
    #[error("failed to write JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Writing YAML output failed
    #[error("failed to write YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_field_paths() {
        let err = DecodeError::TypeMismatch {
            field: "spec.replicas".into(),
            expected: "int32",
            actual: ValueKind::String,
        };
        assert_eq!(err.to_string(), "spec.replicas: expected int32, found string");

        let err = DecodeError::UnionNoMatch {
            field: "spec.strategy.rollingUpdate.maxSurge".into(),
            union: "IntOrString",
            actual: ValueKind::Bool,
        };
        assert_eq!(
            err.to_string(),
            "spec.strategy.rollingUpdate.maxSurge: boolean does not match any alternative of IntOrString"
        );
    }
}
