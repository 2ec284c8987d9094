//! Object metadata and API status types shared by every group.
use std::{collections::BTreeMap, fmt};

use kubewire_core::{
    codec::{Decode, Decoder, Encode, Encoder},
    value::Value,
    wire_object, DecodeError, EncodeError, Time,
};

wire_object! {
    /// Metadata that every persisted object carries.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ObjectMeta {
        /// Unstructured key/value data set by tools and controllers.
        annotations: BTreeMap<String, String> = "annotations",
        /// Server time at which the object was created.
        creation_timestamp: Time = "creationTimestamp",
        /// Seconds allowed for graceful termination once deletion is requested.
        deletion_grace_period_seconds: i64 = "deletionGracePeriodSeconds",
        /// Time after which the object will be removed; set by the server on delete.
        deletion_timestamp: Time = "deletionTimestamp",
        /// Entries that must be cleared before the object is removed from the registry.
        finalizers: Vec<String> = "finalizers",
        /// Prefix for a server generated name, used when `name` is unset.
        generate_name: String = "generateName",
        /// Sequence number of the desired state, bumped on every spec change.
        generation: i64 = "generation",
        /// Identifying key/value pairs used by selectors.
        labels: BTreeMap<String, String> = "labels",
        /// Which actor owns which fields, maintained by the server.
        managed_fields: Vec<ManagedFieldsEntry> = "managedFields",
        /// Unique name within the namespace.
        name: String = "name",
        /// Namespace of the object; empty for cluster scoped objects.
        namespace: String = "namespace",
        /// Objects this one depends on for garbage collection.
        owner_references: Vec<OwnerReference> = "ownerReferences",
        /// Opaque version used for optimistic concurrency and watches.
        resource_version: String = "resourceVersion",
        /// Deprecated link to the object.
        self_link: String = "selfLink",
        /// Cluster-unique identifier, assigned on create.
        uid: String = "uid",
    }
}

wire_object! {
    /// Metadata of a list response.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ListMeta {
        /// Token for fetching the next page.
        continue_: String = "continue",
        /// Number of items left after this page, when the server can tell.
        remaining_item_count: i64 = "remainingItemCount",
        /// Version of the collection, usable as a watch start point.
        resource_version: String = "resourceVersion",
        /// Deprecated link to the list.
        self_link: String = "selfLink",
    }
}

wire_object! {
    /// `apiVersion` and `kind` without further content.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct TypeMeta {
        /// Versioned schema of the object, e.g. `apps/v1`.
        api_version: String = "apiVersion",
        /// REST resource kind, e.g. `Deployment`.
        kind: String = "kind",
    }
}

wire_object! {
    /// Selects objects by labels. Both criteria must hold; an empty selector matches everything.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct LabelSelector {
        /// Set based requirements.
        match_expressions: Vec<LabelSelectorRequirement> = "matchExpressions",
        /// Exact label matches.
        match_labels: BTreeMap<String, String> = "matchLabels",
    }
}

wire_object! {
    /// A set based label requirement such as `tier in (web, cache)`.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct LabelSelectorRequirement {
        /// Label key.
        key: String = "key",
        /// One of `In`, `NotIn`, `Exists` or `DoesNotExist`.
        operator: String = "operator",
        /// Values for `In` and `NotIn`; empty otherwise.
        values: Vec<String> = "values",
    }
}

wire_object! {
    /// Identifies an owning object.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct OwnerReference {
        /// API version of the owner.
        api_version: String = "apiVersion",
        /// Block deletion of the owner until this object is gone (foreground deletion).
        block_owner_deletion: bool = "blockOwnerDeletion",
        /// Whether the owner is the managing controller.
        controller: bool = "controller",
        /// Kind of the owner.
        kind: String = "kind",
        /// Name of the owner.
        name: String = "name",
        /// UID of the owner.
        uid: String = "uid",
    }
}

wire_object! {
    /// Fields owned by one manager at one API version.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct ManagedFieldsEntry {
        /// API version of the field set.
        api_version: String = "apiVersion",
        /// Format of `fieldsV1`; only `FieldsV1` exists.
        fields_type: String = "fieldsType",
        /// The owned field set.
        fields_v1: FieldsV1 = "fieldsV1",
        /// Identifier of the workflow managing these fields.
        manager: String = "manager",
        /// `Apply` or `Update`.
        operation: String = "operation",
        /// Subresource the fields were written through.
        subresource: String = "subresource",
        /// When the fields were last changed.
        time: Time = "time",
    }
}

/// A field set in the server's trie encoding, e.g. `{"f:spec": {"f:replicas": {}}}`.
///
/// Kept verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldsV1(pub Value);

impl Decode for FieldsV1 {
    fn decode(value: Value, _: &mut Decoder) -> Result<Self, DecodeError> {
        Ok(Self(value))
    }
}

impl Encode for FieldsV1 {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(self.0.clone())
    }
}

wire_object! {
    /// One aspect of an object's current state.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Condition {
        /// When `status` last changed.
        last_transition_time: Time = "lastTransitionTime",
        /// Human readable details.
        message: String = "message",
        /// `metadata.generation` the condition was computed for.
        observed_generation: i64 = "observedGeneration",
        /// Machine readable CamelCase reason for the last transition.
        reason: String = "reason",
        /// `True`, `False` or `Unknown`.
        status: String = "status",
        /// Condition type, e.g. `Ready`.
        type_: String = "type",
    }
}

wire_object! {
    /// Result of an operation that does not return an object, and the body of every API error.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Status {
        /// Always `v1`.
        api_version: String = "apiVersion",
        /// Always `Status`.
        kind: String = "kind",
        /// List metadata, rarely populated.
        metadata: ListMeta = "metadata",
        /// `Success` or `Failure`.
        status: String = "status",
        /// Human readable description.
        message: String = "message",
        /// Machine readable reason, e.g. `NotFound` or `AlreadyExists`.
        reason: String = "reason",
        /// Extended data for the reason.
        details: StatusDetails = "details",
        /// HTTP status code.
        code: i32 = "code",
    }
}

impl Status {
    /// A `Success` status
    pub fn success() -> Self {
        Self {
            status: Some("Success".into()),
            ..Self::default()
        }
    }

    /// A `Failure` status with a message and reason
    pub fn failure(message: &str, reason: &str) -> Self {
        Self {
            status: Some("Failure".into()),
            message: Some(message.into()),
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Set the HTTP code
    #[must_use]
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(i32::from(code));
        self
    }

    /// Whether `status` is `Success`
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("Success")
    }

    /// Whether `status` is `Failure`
    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("Failure")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.message.as_deref().unwrap_or_default(),
            self.reason.as_deref().unwrap_or_default()
        )
    }
}

impl std::error::Error for Status {}

wire_object! {
    /// Details attached to a [`Status`].
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct StatusDetails {
        /// Individual causes, e.g. one per invalid field.
        causes: Vec<StatusCause> = "causes",
        /// Group of the affected resource.
        group: String = "group",
        /// Kind of the affected resource.
        kind: String = "kind",
        /// Name of the affected resource.
        name: String = "name",
        /// Seconds a client should wait before retrying.
        retry_after_seconds: i32 = "retryAfterSeconds",
        /// UID of the affected resource.
        uid: String = "uid",
    }
}

wire_object! {
    /// One cause of a failure.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct StatusCause {
        /// Path of the offending field, e.g. `spec.containers[0].name`.
        field: String = "field",
        /// Human readable description.
        message: String = "message",
        /// Machine readable reason, e.g. `FieldValueRequired`.
        reason: String = "reason",
    }
}
