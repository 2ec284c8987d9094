use crate::{
    api::{core_methods::encode_body, Api, Patch, PatchParams, PostParams},
    Error, Result,
};
use kubewire_api::{
    api::{
        apps::v1::{Deployment, StatefulSet},
        autoscaling::v1::Scale,
        core::v1::PersistentVolumeClaim,
        resource::v1::ResourceClaim,
    },
    apiextensions::v1::CustomResourceDefinition,
    Resource,
};
use kubewire_core::codec::Encode;

/// Marker trait for resources that serve a `status` subresource
pub trait StatusSubresource: Resource {}

impl StatusSubresource for Deployment {}
impl StatusSubresource for StatefulSet {}
impl StatusSubresource for PersistentVolumeClaim {}
impl StatusSubresource for ResourceClaim {}
impl StatusSubresource for CustomResourceDefinition {}

/// Marker trait for resources that serve a `scale` subresource
pub trait ScaleSubresource: Resource {}

impl ScaleSubresource for Deployment {}
impl ScaleSubresource for StatefulSet {}

/// Methods for [status subresource](https://kubernetes.io/docs/tasks/extend-kubernetes/custom-resources/custom-resource-definitions/#status-subresource).
impl<K: StatusSubresource> Api<K> {
    /// Get the named resource with a status subresource
    ///
    /// This actually returns the whole K, with metadata, and spec.
    pub async fn get_status(&self, name: &str) -> Result<K> {
        let req = self
            .request
            .get_subresource("status", name)
            .map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// Patch fields on the status object
    ///
    /// NB: Requires that the resource has a status subresource.
    ///
    /// ```no_run
    /// use kubewire_client::{Api, Client, api::{PatchParams, Patch}};
    /// use kubewire_api::api::apps::v1::Deployment;
    /// use serde_json::json;
    ///
    /// # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let deploys: Api<Deployment> = Api::namespaced(client, "apps")?;
    /// let status = json!({"status": {"observedGeneration": 3}});
    /// let d = deploys.patch_status("web", &PatchParams::default(), &Patch::Merge(&status)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn patch_status<P: Encode>(&self, name: &str, pp: &PatchParams, patch: &Patch<P>) -> Result<K> {
        let req = self
            .request
            .patch_subresource("status", name, pp, patch)
            .map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// Replace every field in the status object
    ///
    /// This works similarly to the [`Api::replace`] method, but `.spec` is ignored.
    /// You can leave out the `.spec` entirely from the object you send.
    pub async fn replace_status(&self, name: &str, pp: &PostParams, data: &K) -> Result<K> {
        let bytes = encode_body(data)?;
        let req = self
            .request
            .replace_subresource("status", name, pp, bytes)
            .map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }
}

/// Methods for [scale subresource](https://kubernetes.io/docs/tasks/extend-kubernetes/custom-resources/custom-resource-definitions/#scale-subresource).
impl<K: ScaleSubresource> Api<K> {
    /// Fetch the scale subresource
    pub async fn get_scale(&self, name: &str) -> Result<Scale> {
        let req = self
            .request
            .get_subresource("scale", name)
            .map_err(Error::BuildRequest)?;
        self.client.request::<Scale>(req).await
    }

    /// Update the scale subresource
    pub async fn patch_scale<P: Encode>(&self, name: &str, pp: &PatchParams, patch: &Patch<P>) -> Result<Scale> {
        let req = self
            .request
            .patch_subresource("scale", name, pp, patch)
            .map_err(Error::BuildRequest)?;
        self.client.request::<Scale>(req).await
    }

    /// Replace the scale subresource
    pub async fn replace_scale(&self, name: &str, pp: &PostParams, data: &Scale) -> Result<Scale> {
        let bytes = encode_body(data)?;
        let req = self
            .request
            .replace_subresource("scale", name, pp, bytes)
            .map_err(Error::BuildRequest)?;
        self.client.request::<Scale>(req).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::{Api, Patch, PatchParams, PostParams},
        Client,
    };
    use bytes::Bytes;
    use futures::pin_mut;
    use http::{header, Method, Request, Response};
    use kubewire_api::{
        api::{
            apps::v1::{Deployment, DeploymentStatus, StatefulSet},
            autoscaling::v1::{Scale, ScaleSpec},
            resource::v1::ResourceClaim,
        },
        apiextensions::v1::CustomResourceDefinition,
        Resource,
    };
    use serde_json::json;
    use tower_test::mock;

    fn ok(body: serde_json::Value) -> Response<Bytes> {
        Response::new(Bytes::from(serde_json::to_vec(&body).unwrap()))
    }

    #[tokio::test]
    async fn scale_routes_to_subresource() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::GET);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/db/statefulsets/pg/scale");
            send.send_response(ok(json!({
                "kind": "Scale",
                "apiVersion": "autoscaling/v1",
                "metadata": {"name": "pg"},
                "spec": {"replicas": 3},
                "status": {"replicas": 3, "selector": "app=pg"}
            })));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PATCH);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/db/statefulsets/pg/scale");
            assert_eq!(request.headers()[header::CONTENT_TYPE], "application/merge-patch+json");
            assert_eq!(request.body().as_slice(), br#"{"spec":{"replicas":0}}"#);
            send.send_response(ok(json!({"spec": {"replicas": 0}})));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PUT);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/db/statefulsets/pg/scale");
            assert_eq!(request.body().as_slice(), br#"{"spec":{"replicas":5}}"#);
            send.send_response(ok(json!({"spec": {"replicas": 5}})));
        });

        let sets: Api<StatefulSet> = Api::namespaced(Client::new(mock_service, "default"), "db").unwrap();
        let scale = sets.get_scale("pg").await.unwrap();
        assert_eq!(scale.status.unwrap().selector.as_deref(), Some("app=pg"));

        let patched = sets
            .patch_scale("pg", &PatchParams::default(), &Patch::Merge(json!({"spec": {"replicas": 0}})))
            .await
            .unwrap();
        assert_eq!(patched.spec.unwrap().replicas, Some(0));

        let desired = Scale {
            spec: Some(ScaleSpec { replicas: Some(5) }),
            ..Scale::default()
        };
        let replaced = sets
            .replace_scale("pg", &PostParams::default(), &desired)
            .await
            .unwrap();
        assert_eq!(replaced.spec.unwrap().replicas, Some(5));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn status_routes_to_subresource() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments/web/status");
            send.send_response(ok(json!({"metadata": {"name": "web"}, "status": {"readyReplicas": 2}})));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PUT);
            assert_eq!(
                request.uri().to_string(),
                "/apis/apps/v1/namespaces/default/deployments/web/status?fieldManager=ctl"
            );
            let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
            assert_eq!(body, json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {"name": "web"},
                "status": {"observedGeneration": 4}
            }));
            send.send_response(ok(body));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PATCH);
            assert_eq!(
                request.uri().to_string(),
                "/apis/resource.k8s.io/v1/namespaces/default/resourceclaims/gpu/status"
            );
            send.send_response(ok(json!({"metadata": {"name": "gpu"}})));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(
                request.uri().to_string(),
                "/apis/apiextensions.k8s.io/v1/customresourcedefinitions/widgets.example.com/status"
            );
            send.send_response(ok(json!({"metadata": {"name": "widgets.example.com"}})));
        });

        let client = Client::new(mock_service, "default");
        let deploys: Api<Deployment> = Api::default_namespaced(client.clone()).unwrap();
        let d = deploys.get_status("web").await.unwrap();
        assert_eq!(d.status.unwrap().ready_replicas, Some(2));

        let mut desired = Deployment::named("web");
        desired.status = Some(DeploymentStatus {
            observed_generation: Some(4),
            ..DeploymentStatus::default()
        });
        let pp = PostParams {
            field_manager: Some("ctl".into()),
            ..PostParams::default()
        };
        deploys.replace_status("web", &pp, &desired).await.unwrap();

        let claims: Api<ResourceClaim> = Api::default_namespaced(client.clone()).unwrap();
        let patch = json!({"status": {"devices": []}});
        let claim = claims
            .patch_status("gpu", &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .unwrap();
        assert_eq!(claim.meta().and_then(|m| m.name.as_deref()), Some("gpu"));

        let crds: Api<CustomResourceDefinition> = Api::all(client).unwrap();
        crds.get_status("widgets.example.com").await.unwrap();
        spawned.await.unwrap();
    }
}
