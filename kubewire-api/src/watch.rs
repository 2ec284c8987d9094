//! Types for the watch api
//!
//! See <https://kubernetes.io/docs/reference/using-api/api-concepts/#efficient-detection-of-changes>
use std::fmt;

use kubewire_core::{
    codec::{Decode, Decoder, Encode, Encoder},
    value::{Map, Value},
    wire_object, DecodeError, EncodeError,
};

use crate::apimachinery::meta::v1::Status;

/// A raw event returned from a watch query
///
/// On the wire this is `{"type": "ADDED", "object": {...}}`; a watch response carries
/// many of these as newline separated JSON.
#[derive(Clone, PartialEq)]
pub enum WatchEvent<K> {
    /// Resource was added
    Added(K),
    /// Resource was modified
    Modified(K),
    /// Resource was deleted
    Deleted(K),
    /// Resource bookmark, carrying only a resource version
    Bookmark(Bookmark),
    /// There was some kind of error
    Error(Status),
}

impl<K> WatchEvent<K> {
    /// The wire name of the event type
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Added(_) => "ADDED",
            Self::Modified(_) => "MODIFIED",
            Self::Deleted(_) => "DELETED",
            Self::Bookmark(_) => "BOOKMARK",
            Self::Error(_) => "ERROR",
        }
    }
}

impl<K> fmt::Debug for WatchEvent<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            WatchEvent::Added(_) => write!(f, "Added event"),
            WatchEvent::Modified(_) => write!(f, "Modified event"),
            WatchEvent::Deleted(_) => write!(f, "Deleted event"),
            WatchEvent::Bookmark(_) => write!(f, "Bookmark event"),
            WatchEvent::Error(e) => write!(f, "Error event: {:?}", e),
        }
    }
}

wire_object! {
    /// Slimmed down object sent for bookmark events.
    ///
    /// Can only be relied upon to have a resource version in its metadata.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Bookmark {
        /// apiVersion of the watched resource
        api_version: String = "apiVersion",
        /// kind of the watched resource
        kind: String = "kind",
        /// Basically empty metadata
        metadata: BookmarkMeta = "metadata",
    }
}

impl Bookmark {
    /// The resource version to resume the watch from
    pub fn resource_version(&self) -> Option<&str> {
        self.metadata.as_ref()?.resource_version.as_deref()
    }
}

wire_object! {
    /// Slimmed down metadata of a bookmark.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct BookmarkMeta {
        /// The only field we need from a bookmark event
        resource_version: String = "resourceVersion",
        /// Set on the bookmark that ends the initial event stream
        annotations: std::collections::BTreeMap<String, String> = "annotations",
    }
}

impl<K: Decode> Decode for WatchEvent<K> {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(de.type_mismatch("WatchEvent", &other)),
        };
        de.nested(|de| {
            let event_type: String = match map.remove("type") {
                Some(value) => de.field("type", value)?,
                None => return Err(de.invalid_value("watch event without a type")),
            };
            let object = match map.remove("object") {
                Some(object) if !object.is_null() => object,
                _ => return Err(de.invalid_value("watch event without an object")),
            };
            match event_type.as_str() {
                "ADDED" => de.field("object", object).map(Self::Added),
                "MODIFIED" => de.field("object", object).map(Self::Modified),
                "DELETED" => de.field("object", object).map(Self::Deleted),
                "BOOKMARK" => de.field("object", object).map(Self::Bookmark),
                "ERROR" => de.field("object", object).map(Self::Error),
                other => Err(de.invalid_value(format!("unknown watch event type {other:?}"))),
            }
        })
    }
}

impl<K: Encode> Encode for WatchEvent<K> {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        let object = match self {
            Self::Added(k) | Self::Modified(k) | Self::Deleted(k) => en.field("object", k)?,
            Self::Bookmark(b) => en.field("object", b)?,
            Self::Error(s) => en.field("object", s)?,
        };
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.type_name().into()));
        map.insert("object".into(), object);
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::core::v1::PersistentVolumeClaim;
    use kubewire_core::codec::{from_slice, from_value, to_value};
    use serde_json::json;

    #[test]
    fn decodes_each_event_type() {
        let body = br#"{"type":"ADDED","object":{"metadata":{"name":"data","resourceVersion":"1"}}}
{"type":"MODIFIED","object":{"metadata":{"name":"data","resourceVersion":"2"}}}
{"type":"BOOKMARK","object":{"kind":"PersistentVolumeClaim","apiVersion":"v1","metadata":{"resourceVersion":"3"}}}
{"type":"DELETED","object":{"metadata":{"name":"data","resourceVersion":"4"}}}
{"type":"ERROR","object":{"kind":"Status","apiVersion":"v1","status":"Failure","message":"too old resource version","reason":"Expired","code":410}}"#;
        let events = body
            .split(|b| *b == b'\n')
            .map(from_slice::<WatchEvent<PersistentVolumeClaim>>)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let types: Vec<_> = events.iter().map(WatchEvent::type_name).collect();
        assert_eq!(types, ["ADDED", "MODIFIED", "BOOKMARK", "DELETED", "ERROR"]);
        match &events[2] {
            WatchEvent::Bookmark(b) => assert_eq!(b.resource_version(), Some("3")),
            other => panic!("unexpected {other:?}"),
        }
        match &events[4] {
            WatchEvent::Error(status) => {
                assert_eq!(status.code, Some(410));
                assert_eq!(status.reason.as_deref(), Some("Expired"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_invalid() {
        let err = from_value::<WatchEvent<PersistentVolumeClaim>>(json!({"type": "RENAMED", "object": {}}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { ref reason, .. } if reason.contains("RENAMED")));

        let err = from_value::<WatchEvent<PersistentVolumeClaim>>(json!({"type": "ADDED"})).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { .. }));
    }

    #[test]
    fn object_errors_are_prefixed() {
        let err = from_value::<WatchEvent<PersistentVolumeClaim>>(json!({
            "type": "ADDED",
            "object": {"metadata": {"name": 5}}
        }))
        .unwrap_err();
        assert!(err.to_string().starts_with("object.metadata.name:"));
    }

    #[test]
    fn encodes_type_then_object() {
        let event: WatchEvent<PersistentVolumeClaim> = WatchEvent::Deleted(PersistentVolumeClaim::default());
        assert_eq!(
            kubewire_core::codec::to_string(&event).unwrap(),
            r#"{"type":"DELETED","object":{}}"#
        );
        assert_eq!(to_value(&event).unwrap(), json!({"type": "DELETED", "object": {}}));
    }
}
