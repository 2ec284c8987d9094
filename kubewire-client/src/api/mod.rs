//! API helpers for structured interaction with the Kubernetes API

mod core_methods;

mod subresource;
pub use subresource::{ScaleSubresource, StatusSubresource};

// Re-exports from kubewire-core and kubewire-api
pub use kubewire_api::{List, Resource, ResourceExt, WatchEvent};
pub use kubewire_core::{
    params::{
        DeleteParams, GetParams, ListParams, Patch, PatchParams, PostParams, Preconditions,
        PropagationPolicy, ValidationDirective, VersionMatch, WatchParams,
    },
    Request,
};

use kubewire_api::NamespaceResourceScope;

use crate::{Client, Error, Result};

/// The generic Api abstraction
///
/// This abstracts over a [`Request`] and a type `K` so that
/// we get automatic decoding and encoding on the api calls
/// implemented by a [`Resource`].
#[derive(Clone)]
pub struct Api<K> {
    /// The request builder object with its resource dependent url
    pub(crate) request: Request,
    /// The client to use (from this library)
    pub(crate) client: Client,
    namespace: Option<String>,
    /// Note: Using `iter::Empty` over `PhantomData`, because we never actually keep any
    /// `K` objects, so `Empty` better models our constraints (in particular, `Empty<K>`
    /// is `Send`, even if `K` may not be).
    pub(crate) _phantom: std::iter::Empty<K>,
}

impl<K: Resource> Api<K> {
    /// Cluster level resources, or resources viewed across all namespaces
    pub fn all(client: Client) -> Result<Self> {
        let url = K::url_path(None).map_err(Error::BuildRequest)?;
        Ok(Self {
            client,
            request: Request::new(url),
            namespace: None,
            _phantom: std::iter::empty(),
        })
    }

    /// Namespaced resource within a given namespace
    ///
    /// Fails when `ns` is not a single path segment.
    pub fn namespaced(client: Client, ns: &str) -> Result<Self>
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        let url = K::url_path(Some(ns)).map_err(Error::BuildRequest)?;
        Ok(Self {
            client,
            request: Request::new(url),
            namespace: Some(ns.to_string()),
            _phantom: std::iter::empty(),
        })
    }

    /// Namespaced resource within the default namespace of the [`Client`]
    pub fn default_namespaced(client: Client) -> Result<Self>
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        let ns = client.default_ns().to_string();
        Self::namespaced(client, &ns)
    }

    /// The namespace this `Api` is scoped to, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Consume self and return the [`Client`]
    pub fn into_client(self) -> Client {
        self.into()
    }

    /// Return a reference to the current resource url path
    pub fn resource_url(&self) -> &str {
        &self.request.url_path
    }
}

impl<K> From<Api<K>> for Client {
    fn from(api: Api<K>) -> Self {
        api.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response};
    use kubewire_api::{
        api::{apps::v1::Deployment, coordination::v1::Lease},
        apiextensions::v1::CustomResourceDefinition,
    };
    use tower_test::mock;

    fn client() -> Client {
        let (mock_service, _handle) = mock::pair::<HttpRequest<Vec<u8>>, Response<Bytes>>();
        Client::new(mock_service, "team-a")
    }

    #[tokio::test]
    async fn constructors_scope_urls() {
        let deploys: Api<Deployment> = Api::default_namespaced(client()).unwrap();
        assert_eq!(deploys.resource_url(), "/apis/apps/v1/namespaces/team-a/deployments");
        assert_eq!(deploys.namespace(), Some("team-a"));

        let leases: Api<Lease> = Api::all(client()).unwrap();
        assert_eq!(leases.resource_url(), "/apis/coordination.k8s.io/v1/leases");

        let crds: Api<CustomResourceDefinition> = Api::all(client()).unwrap();
        assert_eq!(crds.resource_url(), "/apis/apiextensions.k8s.io/v1/customresourcedefinitions");
        assert_eq!(crds.namespace(), None);
    }

    #[tokio::test]
    async fn bad_namespace_is_rejected() {
        let err = Api::<Deployment>::namespaced(client(), "a/b").err().unwrap();
        assert!(matches!(
            err,
            Error::BuildRequest(kubewire_core::request::Error::InvalidPathParam { ref param, .. }) if param == "namespace"
        ));
        assert!(Api::<Deployment>::namespaced(client(), "").is_err());
    }
}
