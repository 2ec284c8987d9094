//! Custom resource definitions and their structural schemas.
//!
//! [`JSONSchemaProps`] is recursive: it owns maps and sequences of itself, and three
//! unions ([`JSONSchemaPropsOrBool`], [`JSONSchemaPropsOrArray`],
//! [`JSONSchemaPropsOrStringArray`]) that may hold a nested schema. Decoding deep schemas
//! is bounded by [`DecodeOptions::max_depth`](kubewire_core::DecodeOptions::max_depth).
use std::collections::BTreeMap;

use kubewire_core::{
    codec::{decode_union, Alternative, Decode, Decoder, Encode, Encoder, Shape, Union},
    value::Value,
    wire_object, DecodeError, EncodeError, Time,
};

use crate::{apimachinery::meta::v1::ObjectMeta, resource::ClusterResourceScope};

wire_object! {
    /// Registers a new resource type with the apiserver.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceDefinition {
        /// `apiextensions.k8s.io/v1`.
        api_version: String = "apiVersion",
        /// `CustomResourceDefinition`.
        kind: String = "kind",
        /// Standard object metadata; the name must be `<plural>.<group>`.
        metadata: ObjectMeta = "metadata",
        /// The resource type to serve.
        spec: CustomResourceDefinitionSpec = "spec",
        /// Observed state.
        status: CustomResourceDefinitionStatus = "status",
    }
}

resource!(
    CustomResourceDefinition,
    api_version = "apiextensions.k8s.io/v1",
    group = "apiextensions.k8s.io",
    version = "v1",
    kind = "CustomResourceDefinition",
    plural = "customresourcedefinitions",
    scope = ClusterResourceScope,
);

wire_object! {
    /// How a custom resource type is served.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceDefinitionSpec {
        /// Conversion between versions.
        conversion: CustomResourceConversion = "conversion",
        /// API group of the resource.
        group: String = "group",
        /// Resource and kind names.
        names: CustomResourceDefinitionNames = "names",
        /// Disable pruning of unknown fields; deprecated, must be false.
        preserve_unknown_fields: bool = "preserveUnknownFields",
        /// `Namespaced` or `Cluster`.
        scope: String = "scope",
        /// Served versions; exactly one is the storage version.
        versions: Vec<CustomResourceDefinitionVersion> = "versions",
    }
}

wire_object! {
    /// Names of a custom resource.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CustomResourceDefinitionNames {
        /// Groupings such as `all`.
        categories: Vec<String> = "categories",
        /// CamelCase kind.
        kind: String = "kind",
        /// Kind of list responses; defaults to `<kind>List`.
        list_kind: String = "listKind",
        /// Lowercase plural used in paths.
        plural: String = "plural",
        /// Short names for the CLI.
        short_names: Vec<String> = "shortNames",
        /// Lowercase singular.
        singular: String = "singular",
    }
}

wire_object! {
    /// One served version of a custom resource.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceDefinitionVersion {
        /// Extra columns for table output.
        additional_printer_columns: Vec<CustomResourceColumnDefinition> = "additionalPrinterColumns",
        /// Warn clients using this version.
        deprecated: bool = "deprecated",
        /// Warning text for deprecated versions.
        deprecation_warning: String = "deprecationWarning",
        /// Version name, e.g. `v1beta1`.
        name: String = "name",
        /// Validation schema.
        schema: CustomResourceValidation = "schema",
        /// Fields usable in field selectors.
        selectable_fields: Vec<SelectableField> = "selectableFields",
        /// Whether the version is served.
        served: bool = "served",
        /// Whether objects are persisted in this version.
        storage: bool = "storage",
        /// Enabled subresources.
        subresources: CustomResourceSubresources = "subresources",
    }
}

wire_object! {
    /// A table output column.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CustomResourceColumnDefinition {
        /// Column description.
        description: String = "description",
        /// OpenAPI format of the value.
        format: String = "format",
        /// JSON path evaluated against each object.
        json_path: String = "jsonPath",
        /// Column header.
        name: String = "name",
        /// Zero for the default view, higher for wide views.
        priority: i32 = "priority",
        /// OpenAPI type of the value.
        type_: String = "type",
    }
}

wire_object! {
    /// A field usable in field selectors.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct SelectableField {
        /// JSON path of the field.
        json_path: String = "jsonPath",
    }
}

wire_object! {
    /// Schema wrapper.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceValidation {
        /// Structural OpenAPI v3 schema.
        open_api_v3_schema: JSONSchemaProps = "openAPIV3Schema",
    }
}

wire_object! {
    /// Subresources served for a version.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceSubresources {
        /// Serve `/scale`.
        scale: CustomResourceSubresourceScale = "scale",
        /// Serve `/status`.
        status: CustomResourceSubresourceStatus = "status",
    }
}

wire_object! {
    /// Paths backing the scale subresource.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CustomResourceSubresourceScale {
        /// Path of the serialized label selector in status.
        label_selector_path: String = "labelSelectorPath",
        /// Path of the desired replica count.
        spec_replicas_path: String = "specReplicasPath",
        /// Path of the observed replica count.
        status_replicas_path: String = "statusReplicasPath",
    }
}

wire_object! {
    /// Enables the status subresource. Has no fields; any content is kept.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceSubresourceStatus {
        ..extra
    }
}

wire_object! {
    /// Version conversion settings.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CustomResourceConversion {
        /// `None` or `Webhook`.
        strategy: String = "strategy",
        /// Webhook settings for the `Webhook` strategy.
        webhook: WebhookConversion = "webhook",
    }
}

wire_object! {
    /// A conversion webhook.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct WebhookConversion {
        /// How to reach the webhook.
        client_config: WebhookClientConfig = "clientConfig",
        /// `ConversionReview` versions the webhook understands.
        conversion_review_versions: Vec<String> = "conversionReviewVersions",
    }
}

wire_object! {
    /// Location of a webhook.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct WebhookClientConfig {
        /// PEM bundle, base64 encoded, used to verify the server.
        ca_bundle: String = "caBundle",
        /// In-cluster service hosting the webhook.
        service: ServiceReference = "service",
        /// External URL of the webhook.
        url: String = "url",
    }
}

wire_object! {
    /// A service reference.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ServiceReference {
        /// Service name.
        name: String = "name",
        /// Service namespace.
        namespace: String = "namespace",
        /// URL path.
        path: String = "path",
        /// Service port; 443 when unset.
        port: i32 = "port",
    }
}

wire_object! {
    /// Observed state of a definition.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceDefinitionStatus {
        /// Names actually being served.
        accepted_names: CustomResourceDefinitionNames = "acceptedNames",
        /// Latest observations.
        conditions: Vec<CustomResourceDefinitionCondition> = "conditions",
        /// Versions that have ever been persisted.
        stored_versions: Vec<String> = "storedVersions",
    }
}

wire_object! {
    /// State of a definition at a point in time.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CustomResourceDefinitionCondition {
        /// When `status` last changed.
        last_transition_time: Time = "lastTransitionTime",
        /// Human readable details.
        message: String = "message",
        /// Reason for the last transition.
        reason: String = "reason",
        /// `True`, `False` or `Unknown`.
        status: String = "status",
        /// `Established`, `NamesAccepted` and so on.
        type_: String = "type",
    }
}

wire_object! {
    /// A JSON schema node (draft 4 subset) with Kubernetes extensions.
    ///
    /// Keys that are not declared here survive decode and encode unchanged.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct JSONSchemaProps {
        /// Reference to another schema.
        ref_path: String = "$ref",
        /// Meta-schema URI.
        schema: String = "$schema",
        /// Schema for array items beyond `items`, or whether they are allowed.
        additional_items: JSONSchemaPropsOrBool = "additionalItems",
        /// Schema for undeclared properties, or whether they are allowed.
        additional_properties: JSONSchemaPropsOrBool = "additionalProperties",
        /// Every schema must match.
        all_of: Vec<JSONSchemaProps> = "allOf",
        /// At least one schema must match.
        any_of: Vec<JSONSchemaProps> = "anyOf",
        /// Value applied when the field is absent.
        default: JSON = "default",
        /// Named schemas for `$ref`.
        definitions: BTreeMap<String, JSONSchemaProps> = "definitions",
        /// Schemas or property lists required when a property is present.
        dependencies: BTreeMap<String, JSONSchemaPropsOrStringArray> = "dependencies",
        /// Human readable description.
        description: String = "description",
        /// Allowed values.
        enum_: Vec<JSON> = "enum",
        /// Example value.
        example: JSON = "example",
        /// Whether `maximum` is exclusive.
        exclusive_maximum: bool = "exclusiveMaximum",
        /// Whether `minimum` is exclusive.
        exclusive_minimum: bool = "exclusiveMinimum",
        /// Link to external documentation.
        external_docs: ExternalDocumentation = "externalDocs",
        /// Value format, e.g. `date-time` or `int32`.
        format: String = "format",
        /// Schema identifier.
        id: String = "id",
        /// Schema for every item, or per position.
        items: JSONSchemaPropsOrArray = "items",
        /// Maximum array length.
        max_items: i64 = "maxItems",
        /// Maximum string length.
        max_length: i64 = "maxLength",
        /// Maximum number of properties.
        max_properties: i64 = "maxProperties",
        /// Upper bound for numbers.
        maximum: f64 = "maximum",
        /// Minimum array length.
        min_items: i64 = "minItems",
        /// Minimum string length.
        min_length: i64 = "minLength",
        /// Minimum number of properties.
        min_properties: i64 = "minProperties",
        /// Lower bound for numbers.
        minimum: f64 = "minimum",
        /// Numbers must be a multiple of this.
        multiple_of: f64 = "multipleOf",
        /// Must not match.
        not: Box<JSONSchemaProps> = "not",
        /// Allow `null`.
        nullable: bool = "nullable",
        /// Exactly one schema must match.
        one_of: Vec<JSONSchemaProps> = "oneOf",
        /// Regular expression for strings.
        pattern: String = "pattern",
        /// Schemas for properties whose names match a pattern.
        pattern_properties: BTreeMap<String, JSONSchemaProps> = "patternProperties",
        /// Schemas of named properties.
        properties: BTreeMap<String, JSONSchemaProps> = "properties",
        /// Properties that must be present.
        required: Vec<String> = "required",
        /// Short title.
        title: String = "title",
        /// `object`, `array`, `string`, `integer`, `number` or `boolean`.
        type_: String = "type",
        /// Array items must be distinct.
        unique_items: bool = "uniqueItems",
        /// The object is a full resource with `apiVersion`, `kind` and `metadata`.
        x_kubernetes_embedded_resource: bool = "x-kubernetes-embedded-resource",
        /// Accept integers and strings.
        x_kubernetes_int_or_string: bool = "x-kubernetes-int-or-string",
        /// Keys identifying items of a `map` list.
        x_kubernetes_list_map_keys: Vec<String> = "x-kubernetes-list-map-keys",
        /// `atomic`, `set` or `map`.
        x_kubernetes_list_type: String = "x-kubernetes-list-type",
        /// `granular` or `atomic`.
        x_kubernetes_map_type: String = "x-kubernetes-map-type",
        /// Do not prune unknown fields below this node.
        x_kubernetes_preserve_unknown_fields: bool = "x-kubernetes-preserve-unknown-fields",
        /// CEL validation rules.
        x_kubernetes_validations: Vec<ValidationRule> = "x-kubernetes-validations",
        ..extra
    }
}

wire_object! {
    /// A CEL validation rule. The rule is stored, not evaluated.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ValidationRule {
        /// Field path reported on failure.
        field_path: String = "fieldPath",
        /// Message reported on failure.
        message: String = "message",
        /// CEL expression producing the failure message.
        message_expression: String = "messageExpression",
        /// Also run the rule on create and when the old value is absent.
        optional_old_self: bool = "optionalOldSelf",
        /// Machine readable failure reason.
        reason: String = "reason",
        /// The CEL expression, e.g. `self.minReplicas <= self.maxReplicas`.
        rule: String = "rule",
    }
}

wire_object! {
    /// Link to external documentation.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct ExternalDocumentation {
        /// Link description.
        description: String = "description",
        /// Link target.
        url: String = "url",
    }
}

/// Any JSON value, used for schema defaults, enums and examples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JSON(pub Value);

impl Decode for JSON {
    fn decode(value: Value, _: &mut Decoder) -> Result<Self, DecodeError> {
        Ok(Self(value))
    }
}

impl Encode for JSON {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(self.0.clone())
    }
}

/// A nested schema or a boolean allowing or forbidding everything.
#[derive(Clone, Debug, PartialEq)]
pub enum JSONSchemaPropsOrBool {
    /// `true` or `false`
    Bool(bool),
    /// A schema
    Schema(Box<JSONSchemaProps>),
}

impl Union for JSONSchemaPropsOrBool {
    const NAME: &'static str = "JSONSchemaPropsOrBool";

    fn alternatives() -> &'static [Alternative<Self>] {
        const ALTERNATIVES: &[Alternative<JSONSchemaPropsOrBool>] = &[
            Alternative {
                shape: Shape::Bool,
                decode: |value, de| bool::decode(value, de).map(JSONSchemaPropsOrBool::Bool),
            },
            Alternative {
                shape: Shape::Object,
                decode: |value, de| Box::decode(value, de).map(JSONSchemaPropsOrBool::Schema),
            },
        ];
        ALTERNATIVES
    }
}

impl Decode for JSONSchemaPropsOrBool {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        decode_union(value, de)
    }
}

impl Encode for JSONSchemaPropsOrBool {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        match self {
            Self::Bool(b) => b.encode(en),
            Self::Schema(schema) => schema.encode(en),
        }
    }
}

/// One schema for every item, or one schema per position.
#[derive(Clone, Debug, PartialEq)]
pub enum JSONSchemaPropsOrArray {
    /// Applies to every item
    Schema(Box<JSONSchemaProps>),
    /// Applies per position
    Schemas(Vec<JSONSchemaProps>),
}

impl Union for JSONSchemaPropsOrArray {
    const NAME: &'static str = "JSONSchemaPropsOrArray";

    fn alternatives() -> &'static [Alternative<Self>] {
        const ALTERNATIVES: &[Alternative<JSONSchemaPropsOrArray>] = &[
            Alternative {
                shape: Shape::Object,
                decode: |value, de| Box::decode(value, de).map(JSONSchemaPropsOrArray::Schema),
            },
            Alternative {
                shape: Shape::Array,
                decode: |value, de| Vec::decode(value, de).map(JSONSchemaPropsOrArray::Schemas),
            },
        ];
        ALTERNATIVES
    }
}

impl Decode for JSONSchemaPropsOrArray {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        decode_union(value, de)
    }
}

impl Encode for JSONSchemaPropsOrArray {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        match self {
            Self::Schema(schema) => schema.encode(en),
            Self::Schemas(schemas) => schemas.encode(en),
        }
    }
}

/// A schema dependency or a list of required property names.
#[derive(Clone, Debug, PartialEq)]
pub enum JSONSchemaPropsOrStringArray {
    /// A schema that must also match
    Schema(Box<JSONSchemaProps>),
    /// Properties that must also be present
    Property(Vec<String>),
}

impl Union for JSONSchemaPropsOrStringArray {
    const NAME: &'static str = "JSONSchemaPropsOrStringArray";

    fn alternatives() -> &'static [Alternative<Self>] {
        const ALTERNATIVES: &[Alternative<JSONSchemaPropsOrStringArray>] = &[
            Alternative {
                shape: Shape::Object,
                decode: |value, de| Box::decode(value, de).map(JSONSchemaPropsOrStringArray::Schema),
            },
            Alternative {
                shape: Shape::Array,
                decode: |value, de| Vec::decode(value, de).map(JSONSchemaPropsOrStringArray::Property),
            },
        ];
        ALTERNATIVES
    }
}

impl Decode for JSONSchemaPropsOrStringArray {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        decode_union(value, de)
    }
}

impl Encode for JSONSchemaPropsOrStringArray {
    fn encode(&self, en: &mut Encoder) -> Result<Value, EncodeError> {
        match self {
            Self::Schema(schema) => schema.encode(en),
            Self::Property(names) => names.encode(en),
        }
    }
}
