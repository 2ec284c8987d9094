//! Query and body parameters for the REST verbs
use serde::Serialize;

use crate::{codec::Encode, request::Error, EncodeError};

type Query = form_urlencoded::Serializer<'static, String>;

/// How `resourceVersion` is interpreted on list calls
///
/// See <https://kubernetes.io/docs/reference/using-api/api-concepts/#semantics-for-get-and-list>.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionMatch {
    /// Serve data at least as new as the given version
    NotOlderThan,
    /// Serve data at exactly the given version, or fail with 410 Gone
    Exact,
}

impl VersionMatch {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NotOlderThan => "NotOlderThan",
            Self::Exact => "Exact",
        }
    }
}

/// Query parameters for list and delete-collection calls
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Restrict results by label, e.g. `app=web,tier!=cache`
    pub label_selector: Option<String>,
    /// Restrict results by field, e.g. `metadata.name=web`
    pub field_selector: Option<String>,
    /// Server side timeout for the call in seconds
    pub timeout: Option<u32>,
    /// Page size; the server answers with a continue token when more results exist
    pub limit: Option<u32>,
    /// Token from a previous page
    pub continue_token: Option<String>,
    /// How `resource_version` is matched
    pub version_match: Option<VersionMatch>,
    /// Resource version to read at
    pub resource_version: Option<String>,
}

impl ListParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match (&self.resource_version, &self.version_match) {
            (Some(rv), Some(VersionMatch::Exact)) if rv == "0" => Err(Error::Validation(
                "a non-zero resource_version is required for an Exact match".into(),
            )),
            (None, Some(_)) => Err(Error::Validation(
                "a resource_version is required when a version match is set".into(),
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn populate_selectors(&self, qp: &mut Query) {
        if let Some(fields) = &self.field_selector {
            qp.append_pair("fieldSelector", fields);
        }
        if let Some(labels) = &self.label_selector {
            qp.append_pair("labelSelector", labels);
        }
    }

    pub(crate) fn populate_qp(&self, qp: &mut Query) {
        self.populate_selectors(qp);
        if let Some(timeout) = &self.timeout {
            qp.append_pair("timeoutSeconds", &timeout.to_string());
        }
        if let Some(limit) = &self.limit {
            qp.append_pair("limit", &limit.to_string());
        }
        if let Some(token) = &self.continue_token {
            // the token already pins a version
            qp.append_pair("continue", token);
        } else if let Some(rv) = &self.resource_version {
            if rv != "0" || self.limit.is_none() {
                qp.append_pair("resourceVersion", rv);
                if let Some(vm) = &self.version_match {
                    qp.append_pair("resourceVersionMatch", vm.as_str());
                }
            }
        }
    }

    /// Set the server side timeout
    #[must_use]
    pub fn timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout = Some(timeout_secs);
        self
    }

    /// Restrict results by field
    #[must_use]
    pub fn fields(mut self, field_selector: &str) -> Self {
        self.field_selector = Some(field_selector.to_owned());
        self
    }

    /// Restrict results by label
    #[must_use]
    pub fn labels(mut self, label_selector: &str) -> Self {
        self.label_selector = Some(label_selector.to_owned());
        self
    }

    /// Set the page size
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue from a previous page
    #[must_use]
    pub fn continue_token(mut self, token: &str) -> Self {
        self.continue_token = Some(token.to_owned());
        self
    }

    /// Read at a resource version
    #[must_use]
    pub fn at(mut self, resource_version: &str) -> Self {
        self.resource_version = Some(resource_version.to_owned());
        self
    }

    /// Set the version match strategy; requires [`ListParams::at`]
    #[must_use]
    pub fn matching(mut self, version_match: VersionMatch) -> Self {
        self.version_match = Some(version_match);
        self
    }

    /// Accept data at any resource version, possibly stale
    #[must_use]
    pub fn match_any(self) -> Self {
        self.matching(VersionMatch::NotOlderThan).at("0")
    }
}

/// Query parameters for get calls
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetParams {
    /// Resource version to read at, matched as not-older-than
    pub resource_version: Option<String>,
}

impl GetParams {
    /// Read at a resource version
    #[must_use]
    pub fn at(resource_version: &str) -> Self {
        Self {
            resource_version: Some(resource_version.to_owned()),
        }
    }

    /// Read from the cache at any version
    #[must_use]
    pub fn any() -> Self {
        Self::at("0")
    }

    pub(crate) fn populate_qp(&self, qp: &mut Query) {
        if let Some(rv) = &self.resource_version {
            qp.append_pair("resourceVersion", rv);
        }
    }
}

/// Server side handling of unknown or duplicate fields in a write
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationDirective {
    /// Reject the request
    Strict,
    /// Accept the request and return warnings
    Warn,
    /// Silently drop the offending fields
    Ignore,
}

impl ValidationDirective {
    /// Query string form of the directive
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Warn => "Warn",
            Self::Ignore => "Ignore",
        }
    }
}

/// Query parameters for watch calls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchParams {
    /// Restrict events by label
    pub label_selector: Option<String>,
    /// Restrict events by field
    pub field_selector: Option<String>,
    /// Server side timeout in seconds; 290 when unset, and must stay below 295
    pub timeout: Option<u32>,
    /// Ask for `BOOKMARK` events
    pub bookmarks: bool,
    /// Start with synthetic events for the current state of the collection
    pub send_initial_events: bool,
}

impl Default for WatchParams {
    fn default() -> Self {
        Self {
            label_selector: None,
            field_selector: None,
            timeout: None,
            bookmarks: true,
            send_initial_events: false,
        }
    }
}

impl WatchParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if matches!(self.timeout, Some(timeout) if timeout >= 295) {
            return Err(Error::Validation("WatchParams::timeout must be below 295s".into()));
        }
        if self.send_initial_events && !self.bookmarks {
            return Err(Error::Validation(
                "WatchParams::send_initial_events needs bookmarks".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn populate_qp(&self, qp: &mut Query) {
        qp.append_pair("watch", "true");
        qp.append_pair("timeoutSeconds", &self.timeout.unwrap_or(290).to_string());
        if let Some(fields) = &self.field_selector {
            qp.append_pair("fieldSelector", fields);
        }
        if let Some(labels) = &self.label_selector {
            qp.append_pair("labelSelector", labels);
        }
        if self.bookmarks {
            qp.append_pair("allowWatchBookmarks", "true");
        }
        if self.send_initial_events {
            qp.append_pair("sendInitialEvents", "true");
            qp.append_pair("resourceVersionMatch", "NotOlderThan");
        }
    }

    /// Set the server side timeout
    #[must_use]
    pub fn timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout = Some(timeout_secs);
        self
    }

    /// Restrict events by field
    #[must_use]
    pub fn fields(mut self, field_selector: &str) -> Self {
        self.field_selector = Some(field_selector.to_owned());
        self
    }

    /// Restrict events by label
    #[must_use]
    pub fn labels(mut self, label_selector: &str) -> Self {
        self.label_selector = Some(label_selector.to_owned());
        self
    }

    /// Do not ask for bookmarks
    #[must_use]
    pub fn disable_bookmarks(mut self) -> Self {
        self.bookmarks = false;
        self
    }

    /// Begin the watch with the current state of the collection
    #[must_use]
    pub fn initial_events(mut self) -> Self {
        self.send_initial_events = true;
        self
    }
}

/// Query parameters for create and replace calls
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostParams {
    /// Validate without persisting
    pub dry_run: bool,
    /// Name of the actor making the change
    pub field_manager: Option<String>,
}

impl PostParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        validate_field_manager(self.field_manager.as_deref(), "PostParams")
    }

    pub(crate) fn populate_qp(&self, qp: &mut Query) {
        if self.dry_run {
            qp.append_pair("dryRun", "All");
        }
        if let Some(fm) = &self.field_manager {
            qp.append_pair("fieldManager", fm);
        }
    }
}

fn validate_field_manager(field_manager: Option<&str>, owner: &str) -> Result<(), Error> {
    match field_manager {
        Some(fm) if fm.len() > 128 => Err(Error::Validation(format!(
            "{owner}::field_manager must be at most 128 bytes"
        ))),
        _ => Ok(()),
    }
}

/// A patch body and its merge strategy
///
/// ```
/// use kubewire_core::params::Patch;
/// let patch = Patch::Merge(serde_json::json!({"spec": {"replicas": 2}}));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T: Encode> {
    /// Server side apply
    Apply(T),
    /// JSON merge patch (RFC 7386)
    Merge(T),
    /// Strategic merge patch, which honors per-field merge keys
    Strategic(T),
}

impl<T: Encode> Patch<T> {
    pub(crate) fn is_apply(&self) -> bool {
        matches!(self, Self::Apply(_))
    }

    /// Media type of the patch body
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Apply(_) => "application/apply-patch+yaml",
            Self::Merge(_) => "application/merge-patch+json",
            Self::Strategic(_) => "application/strategic-merge-patch+json",
        }
    }

    /// Encode the patch body as JSON
    pub fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Self::Apply(p) | Self::Merge(p) | Self::Strategic(p) => crate::codec::to_vec(p),
        }
    }
}

/// Query parameters for patch calls
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchParams {
    /// Validate without persisting
    pub dry_run: bool,
    /// Take ownership of conflicting fields; server side apply only
    pub force: bool,
    /// Name of the actor making the change; required for server side apply
    pub field_manager: Option<String>,
    /// Handling of unknown or duplicate fields
    pub field_validation: Option<ValidationDirective>,
}

impl PatchParams {
    pub(crate) fn validate<P: Encode>(&self, patch: &Patch<P>) -> Result<(), Error> {
        validate_field_manager(self.field_manager.as_deref(), "PatchParams")?;
        if self.force && !patch.is_apply() {
            return Err(Error::Validation(
                "PatchParams::force only works with Patch::Apply".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn populate_qp(&self, qp: &mut Query) {
        if self.dry_run {
            qp.append_pair("dryRun", "All");
        }
        if self.force {
            qp.append_pair("force", "true");
        }
        if let Some(fm) = &self.field_manager {
            qp.append_pair("fieldManager", fm);
        }
        if let Some(fv) = &self.field_validation {
            qp.append_pair("fieldValidation", fv.as_str());
        }
    }

    /// Parameters for server side apply as `manager`
    #[must_use]
    pub fn apply(manager: &str) -> Self {
        Self {
            field_manager: Some(manager.to_owned()),
            ..Self::default()
        }
    }

    /// Force through conflicts
    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Validate without persisting
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Set the field validation directive
    #[must_use]
    pub fn validation(mut self, directive: ValidationDirective) -> Self {
        self.field_validation = Some(directive);
        self
    }
}

/// Body parameters for delete calls
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    /// Validate without persisting
    #[serde(serialize_with = "dry_run_all_ser", skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,

    /// Seconds before the object is removed; zero deletes immediately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u32>,

    /// Whether and how dependents are garbage collected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_policy: Option<PropagationPolicy>,

    /// Conditions the stored object must meet, else 409 Conflict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Preconditions>,
}

impl DeleteParams {
    /// Delete dependents in the background
    pub fn background() -> Self {
        Self {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Self::default()
        }
    }

    /// Delete dependents before the owner
    pub fn foreground() -> Self {
        Self {
            propagation_policy: Some(PropagationPolicy::Foreground),
            ..Self::default()
        }
    }

    /// Leave dependents behind
    pub fn orphan() -> Self {
        Self {
            propagation_policy: Some(PropagationPolicy::Orphan),
            ..Self::default()
        }
    }

    /// Validate without persisting
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Set the grace period
    #[must_use]
    pub fn grace_period(mut self, secs: u32) -> Self {
        self.grace_period_seconds = Some(secs);
        self
    }

    /// Set preconditions
    #[must_use]
    pub fn preconditions(mut self, preconditions: Preconditions) -> Self {
        self.preconditions = Some(preconditions);
        self
    }

    pub(crate) fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

// The body form of dryRun is a list of stages, of which only "All" exists.
fn dry_run_all_ser<S: serde::Serializer>(dry_run: &bool, s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeTuple;
    if *dry_run {
        let mut tuple = s.serialize_tuple(1)?;
        tuple.serialize_element("All")?;
        tuple.end()
    } else {
        s.serialize_none()
    }
}

/// Conditions checked before a write is carried out
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preconditions {
    /// Required resource version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    /// Required UID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Garbage collection policy for dependents of a deleted object
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PropagationPolicy {
    /// Leave dependents in place
    Orphan,
    /// Delete dependents after the owner
    Background,
    /// Delete dependents before the owner
    Foreground,
}
