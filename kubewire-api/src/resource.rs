use std::collections::BTreeMap;

use kubewire_core::{
    codec::{Decode, Encode},
    request, PathTemplate, Time,
};

use crate::{
    api::core::v1::ObjectReference,
    apimachinery::meta::v1::{ManagedFieldsEntry, ObjectMeta, OwnerReference},
};

/// Whether a resource lives inside a namespace
pub trait ResourceScope {
    /// `true` for namespaced resources
    const NAMESPACED: bool;
}

/// Marker for resources that live inside a namespace
#[derive(Clone, Copy, Debug)]
pub struct NamespaceResourceScope;

impl ResourceScope for NamespaceResourceScope {
    const NAMESPACED: bool = true;
}

/// Marker for resources that live at cluster level
#[derive(Clone, Copy, Debug)]
pub struct ClusterResourceScope;

impl ResourceScope for ClusterResourceScope {
    const NAMESPACED: bool = false;
}

const CORE_CLUSTER: PathTemplate<'static> = PathTemplate::new("/api/{version}/{plural}");
const CORE_NAMESPACED: PathTemplate<'static> =
    PathTemplate::new("/api/{version}/namespaces/{namespace}/{plural}");
const GROUP_CLUSTER: PathTemplate<'static> = PathTemplate::new("/apis/{group}/{version}/{plural}");
const GROUP_NAMESPACED: PathTemplate<'static> =
    PathTemplate::new("/apis/{group}/{version}/namespaces/{namespace}/{plural}");

/// A top-level API object with a REST collection
pub trait Resource: Decode + Encode + Default {
    /// `apiVersion` on the wire, e.g. `apps/v1`
    const API_VERSION: &'static str;
    /// API group; empty for the core group
    const GROUP: &'static str;
    /// `kind` on the wire
    const KIND: &'static str;
    /// API version within the group
    const VERSION: &'static str;
    /// Plural name used in the REST path
    const URL_PATH_SEGMENT: &'static str;
    /// Namespace or cluster scope
    type Scope: ResourceScope;

    /// The object's metadata, if set
    fn meta(&self) -> Option<&ObjectMeta>;

    /// The object's metadata, initialized when unset
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// The `apiVersion` and `kind` slots
    fn type_meta_mut(&mut self) -> (&mut Option<String>, &mut Option<String>);

    /// Collection path, scoped to `namespace` when one is given.
    ///
    /// ```
    /// use kubewire_api::{api::apps::v1::Deployment, Resource};
    /// assert_eq!(
    ///     Deployment::url_path(Some("prod")).unwrap(),
    ///     "/apis/apps/v1/namespaces/prod/deployments"
    /// );
    /// ```
    fn url_path(namespace: Option<&str>) -> Result<String, request::Error> {
        let mut params = vec![("version", Self::VERSION), ("plural", Self::URL_PATH_SEGMENT)];
        let template = match (Self::GROUP.is_empty(), namespace) {
            (true, None) => CORE_CLUSTER,
            (true, Some(ns)) => {
                params.push(("namespace", ns));
                CORE_NAMESPACED
            }
            (false, None) => {
                params.push(("group", Self::GROUP));
                GROUP_CLUSTER
            }
            (false, Some(ns)) => {
                params.extend([("group", Self::GROUP), ("namespace", ns)]);
                GROUP_NAMESPACED
            }
        };
        template.render(&params)
    }

    /// An empty object with `apiVersion`, `kind` and `metadata.name` filled in
    fn named(name: &str) -> Self {
        let mut object = Self::default();
        let (api_version, kind) = object.type_meta_mut();
        *api_version = Some(Self::API_VERSION.to_owned());
        *kind = Some(Self::KIND.to_owned());
        object.meta_mut().name = Some(name.to_owned());
        object
    }

    /// A reference to this object
    fn object_ref(&self) -> ObjectReference {
        let meta = self.meta();
        ObjectReference {
            api_version: Some(Self::API_VERSION.to_owned()),
            kind: Some(Self::KIND.to_owned()),
            name: meta.and_then(|m| m.name.clone()),
            namespace: meta.and_then(|m| m.namespace.clone()),
            uid: meta.and_then(|m| m.uid.clone()),
            ..ObjectReference::default()
        }
    }

    /// An owner reference marking this object as the controller of another.
    ///
    /// `None` when the object has no name or uid yet.
    fn controller_owner_ref(&self) -> Option<OwnerReference> {
        let meta = self.meta()?;
        Some(OwnerReference {
            api_version: Some(Self::API_VERSION.to_owned()),
            kind: Some(Self::KIND.to_owned()),
            name: Some(meta.name.clone()?),
            uid: Some(meta.uid.clone()?),
            controller: Some(true),
            ..OwnerReference::default()
        })
    }
}

static EMPTY_MAP: BTreeMap<String, String> = BTreeMap::new();

/// Accessors for common metadata
pub trait ResourceExt: Resource {
    /// `metadata.name`, falling back to `metadata.generateName`, else empty
    fn name_any(&self) -> String;
    /// `metadata.namespace`
    fn namespace(&self) -> Option<String>;
    /// `metadata.resourceVersion`
    fn resource_version(&self) -> Option<String>;
    /// `metadata.uid`
    fn uid(&self) -> Option<String>;
    /// `metadata.creationTimestamp`
    fn creation_timestamp(&self) -> Option<Time>;
    /// `metadata.labels`, empty when unset
    fn labels(&self) -> &BTreeMap<String, String>;
    /// Mutable `metadata.labels`
    fn labels_mut(&mut self) -> &mut BTreeMap<String, String>;
    /// `metadata.annotations`, empty when unset
    fn annotations(&self) -> &BTreeMap<String, String>;
    /// Mutable `metadata.annotations`
    fn annotations_mut(&mut self) -> &mut BTreeMap<String, String>;
    /// `metadata.ownerReferences`
    fn owner_references(&self) -> &[OwnerReference];
    /// `metadata.finalizers`
    fn finalizers(&self) -> &[String];
    /// Mutable `metadata.finalizers`
    fn finalizers_mut(&mut self) -> &mut Vec<String>;
    /// `metadata.managedFields`
    fn managed_fields(&self) -> &[ManagedFieldsEntry];
}

impl<K: Resource> ResourceExt for K {
    fn name_any(&self) -> String {
        self.meta()
            .and_then(|m| m.name.clone().or_else(|| m.generate_name.clone()))
            .unwrap_or_default()
    }

    fn namespace(&self) -> Option<String> {
        self.meta()?.namespace.clone()
    }

    fn resource_version(&self) -> Option<String> {
        self.meta()?.resource_version.clone()
    }

    fn uid(&self) -> Option<String> {
        self.meta()?.uid.clone()
    }

    fn creation_timestamp(&self) -> Option<Time> {
        self.meta()?.creation_timestamp
    }

    fn labels(&self) -> &BTreeMap<String, String> {
        self.meta().and_then(|m| m.labels.as_ref()).unwrap_or(&EMPTY_MAP)
    }

    fn labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.meta_mut().labels.get_or_insert_with(BTreeMap::new)
    }

    fn annotations(&self) -> &BTreeMap<String, String> {
        self.meta().and_then(|m| m.annotations.as_ref()).unwrap_or(&EMPTY_MAP)
    }

    fn annotations_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.meta_mut().annotations.get_or_insert_with(BTreeMap::new)
    }

    fn owner_references(&self) -> &[OwnerReference] {
        self.meta()
            .and_then(|m| m.owner_references.as_deref())
            .unwrap_or_default()
    }

    fn finalizers(&self) -> &[String] {
        self.meta().and_then(|m| m.finalizers.as_deref()).unwrap_or_default()
    }

    fn finalizers_mut(&mut self) -> &mut Vec<String> {
        self.meta_mut().finalizers.get_or_insert_with(Vec::new)
    }

    fn managed_fields(&self) -> &[ManagedFieldsEntry] {
        self.meta()
            .and_then(|m| m.managed_fields.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{apps::v1::Deployment, coordination::v1::Lease, core::v1::PersistentVolumeClaim},
        apiextensions::v1::CustomResourceDefinition,
    };

    #[test]
    fn url_paths_by_group_and_scope() {
        assert_eq!(
            PersistentVolumeClaim::url_path(Some("ns")).unwrap(),
            "/api/v1/namespaces/ns/persistentvolumeclaims"
        );
        assert_eq!(
            PersistentVolumeClaim::url_path(None).unwrap(),
            "/api/v1/persistentvolumeclaims"
        );
        assert_eq!(
            Lease::url_path(Some("kube-system")).unwrap(),
            "/apis/coordination.k8s.io/v1/namespaces/kube-system/leases"
        );
        assert_eq!(
            CustomResourceDefinition::url_path(None).unwrap(),
            "/apis/apiextensions.k8s.io/v1/customresourcedefinitions"
        );
        assert!(Deployment::url_path(Some("")).is_err());
    }

    #[test]
    fn named_objects_carry_type_meta() {
        let d = Deployment::named("web");
        assert_eq!(d.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(d.kind.as_deref(), Some("Deployment"));
        assert_eq!(d.name_any(), "web");
    }

    #[test]
    fn metadata_accessors() {
        let mut d = Deployment::default();
        assert!(d.labels().is_empty());
        assert_eq!(d.name_any(), "");
        d.labels_mut().insert("app".into(), "web".into());
        d.meta_mut().uid = Some("1234".into());
        assert_eq!(d.labels().get("app").map(String::as_str), Some("web"));
        assert!(d.controller_owner_ref().is_none());

        d.meta_mut().name = Some("web".into());
        let owner = d.controller_owner_ref().unwrap();
        assert_eq!(owner.kind.as_deref(), Some("Deployment"));
        assert_eq!(owner.controller, Some(true));

        let reference = d.object_ref();
        assert_eq!(reference.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(reference.uid.as_deref(), Some("1234"));
    }
}
