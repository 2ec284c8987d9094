use either::Either;

use crate::{api::Api, Error, Result};
use kubewire_api::{apimachinery::meta::v1::Status, List, Resource, WatchEvent};
use kubewire_core::{
    codec::{self, Encode},
    params::*,
    request,
};

/// PUSH/PUT/POST/GET abstractions
impl<K: Resource> Api<K> {
    /// Get a named resource
    ///
    /// ```no_run
    /// # use kubewire_client::{Api, Client};
    /// use kubewire_api::api::apps::v1::Deployment;
    ///
    /// # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let deploys: Api<Deployment> = Api::namespaced(client, "apps")?;
    /// let d: Deployment = deploys.get("blog").await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// This function assumes that the object is expected to always exist, and returns [`Error`] if it does not.
    /// Consider using [`Api::get_opt`] if you need to handle missing objects.
    pub async fn get(&self, name: &str) -> Result<K> {
        self.get_with(name, &GetParams::default()).await
    }

    /// [Get](`Api::get`) a named resource with an explicit resourceVersion
    ///
    /// This function allows the caller to pass in a [`GetParams`](`super::GetParams`) type containing
    /// a `resourceVersion` to a [Get](`Api::get`) call.
    pub async fn get_with(&self, name: &str, gp: &GetParams) -> Result<K> {
        let req = self.request.get(name, gp).map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// [Get](`Api::get`) a named resource if it exists, returns [`None`] if it doesn't exist
    pub async fn get_opt(&self, name: &str) -> Result<Option<K>> {
        match self.get(name).await {
            Ok(obj) => Ok(Some(obj)),
            Err(Error::Api(status)) if status.code == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Get a list of resources
    ///
    /// You use this to get everything, or a subset matching fields/labels, say:
    ///
    /// ```no_run
    /// # use kubewire_client::{Api, Client, api::{ListParams, ResourceExt}};
    /// use kubewire_api::api::core::v1::PersistentVolumeClaim;
    ///
    /// # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let claims: Api<PersistentVolumeClaim> = Api::namespaced(client, "apps")?;
    /// let lp = ListParams::default().labels("app=blog");
    /// for c in claims.list(&lp).await? {
    ///     println!("Found claim {}", c.name_any());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list(&self, lp: &ListParams) -> Result<List<K>> {
        let req = self.request.list(lp).map_err(Error::BuildRequest)?;
        self.client.request::<List<K>>(req).await
    }

    /// Create a resource
    ///
    /// This function requires a type that encodes to `K`, which can be:
    /// 1. Raw string YAML decoded into `K` with [`codec::from_str`]
    /// 2. An instance of `K` built in code
    pub async fn create(&self, pp: &PostParams, data: &K) -> Result<K> {
        let bytes = encode_body(data)?;
        let req = self.request.create(pp, bytes).map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// Delete a named resource
    ///
    /// When you get a `K` via `Left`, your delete has started.
    /// When you get a `Status` via `Right`, this should be a a 2XX style
    /// confirmation that the object being gone.
    ///
    /// 4XX and 5XX status types are returned as an [`Err(Error::Api)`](crate::Error::Api).
    pub async fn delete(&self, name: &str, dp: &DeleteParams) -> Result<Either<K, Status>> {
        let req = self.request.delete(name, dp).map_err(Error::BuildRequest)?;
        self.client.request_status::<K>(req).await
    }

    /// Delete a collection of resources
    ///
    /// When you get an `List<K>` via `Left`, your delete has started.
    /// When you get a `Status` via `Right`, this should be a a 2XX style
    /// confirmation that the object being gone.
    ///
    /// Only the label and field selectors of `lp` are sent.
    pub async fn delete_collection(
        &self,
        dp: &DeleteParams,
        lp: &ListParams,
    ) -> Result<Either<List<K>, Status>> {
        let req = self
            .request
            .delete_collection(dp, lp)
            .map_err(Error::BuildRequest)?;
        self.client.request_status::<List<K>>(req).await
    }

    /// Patch a subset of a resource's properties
    ///
    /// Takes a [`Patch`] along with [`PatchParams`] for the call.
    ///
    /// ```no_run
    /// # use kubewire_client::{Api, Client, api::{Patch, PatchParams}};
    /// use kubewire_api::api::apps::v1::Deployment;
    /// use serde_json::json;
    ///
    /// # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let deploys: Api<Deployment> = Api::namespaced(client, "apps")?;
    /// let patch = json!({
    ///     "apiVersion": "apps/v1",
    ///     "kind": "Deployment",
    ///     "spec": {"replicas": 2}
    /// });
    /// let params = PatchParams::apply("myapp");
    /// let d = deploys.patch("blog", &params, &Patch::Apply(&patch)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn patch<P: Encode>(&self, name: &str, pp: &PatchParams, patch: &Patch<P>) -> Result<K> {
        let req = self.request.patch(name, pp, patch).map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// Replace a resource entirely with a new one
    ///
    /// This is used just like [`Api::create`], but with one additional instruction:
    /// You must set `metadata.resourceVersion` in the provided data because k8s
    /// will not accept an update unless you actually knew what the last version was.
    pub async fn replace(&self, name: &str, pp: &PostParams, data: &K) -> Result<K> {
        let bytes = encode_body(data)?;
        let req = self
            .request
            .replace(name, pp, bytes)
            .map_err(Error::BuildRequest)?;
        self.client.request::<K>(req).await
    }

    /// Watch a list of resources
    ///
    /// The response body is read to the end and every event in it is returned;
    /// continuing from the last seen `resourceVersion` is up to the caller.
    ///
    /// ```no_run
    /// # use kubewire_client::{Api, Client, api::{WatchEvent, WatchParams}};
    /// use kubewire_api::api::coordination::v1::Lease;
    ///
    /// # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let leases: Api<Lease> = Api::namespaced(client, "kube-system")?;
    /// let wp = WatchParams::default().timeout(10);
    /// for event in leases.watch(&wp, "0").await? {
    ///     if let WatchEvent::Error(status) = event {
    ///         println!("watch failed: {status}");
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn watch(&self, wp: &WatchParams, version: &str) -> Result<Vec<WatchEvent<K>>> {
        let req = self.request.watch(wp, version).map_err(Error::BuildRequest)?;
        self.client.request_events::<K>(req).await
    }
}

pub(crate) fn encode_body<T: Encode>(data: &T) -> Result<Vec<u8>> {
    codec::to_vec(data).map_err(|e| Error::BuildRequest(request::Error::EncodeBody(e)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams, WatchEvent, WatchParams},
        Client, Error,
    };
    use bytes::Bytes;
    use futures::pin_mut;
    use http::{header, Method, Request, Response};
    use kubewire_api::{
        api::{apps::v1::Deployment, core::v1::PersistentVolumeClaim},
        Resource, ResourceExt,
    };
    use kubewire_core::codec;
    use serde_json::json;
    use tower_test::mock;

    fn ok(body: serde_json::Value) -> Response<Bytes> {
        Response::builder()
            .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_decodes_object() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::GET);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments/web");
            send.send_response(ok(json!({
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "metadata": {"name": "web", "annotations": {"kubewire": "test"}},
                "spec": {"replicas": 0, "template": {"spec": {"containers": [{"name": "web", "image": "nginx"}]}}}
            })));
        });

        let deploys: Api<Deployment> = Api::default_namespaced(Client::new(mock_service, "default")).unwrap();
        let deploy = deploys.get("web").await.unwrap();
        assert_eq!(deploy.annotations().get("kubewire").unwrap(), "test");
        assert_eq!(deploy.spec.unwrap().replicas, Some(0));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn get_opt_maps_not_found() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(
                Response::builder()
                    .status(404)
                    .body(Bytes::from_static(
                        br#"{"kind":"Status","apiVersion":"v1","status":"Failure","reason":"NotFound","code":404}"#,
                    ))
                    .unwrap(),
            );
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(
                Response::builder()
                    .status(403)
                    .body(Bytes::from_static(
                        br#"{"kind":"Status","apiVersion":"v1","status":"Failure","reason":"Forbidden","code":403}"#,
                    ))
                    .unwrap(),
            );
        });

        let claims: Api<PersistentVolumeClaim> = Api::namespaced(Client::new(mock_service, "default"), "db").unwrap();
        assert!(claims.get_opt("data").await.unwrap().is_none());
        let err = claims.get_opt("data").await.unwrap_err();
        assert_eq!(err.api_code(), Some(403));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn list_sends_selectors() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(
                request.uri().to_string(),
                "/api/v1/namespaces/db/persistentvolumeclaims?labelSelector=app%3Dpg&limit=2"
            );
            send.send_response(ok(json!({
                "kind": "PersistentVolumeClaimList",
                "apiVersion": "v1",
                "metadata": {"resourceVersion": "77", "continue": "next"},
                "items": [{"metadata": {"name": "a"}}, {"metadata": {"name": "b"}}]
            })));
        });

        let claims: Api<PersistentVolumeClaim> = Api::namespaced(Client::new(mock_service, "default"), "db").unwrap();
        let list = claims
            .list(&ListParams::default().labels("app=pg").limit(2))
            .await
            .unwrap();
        assert_eq!(list.metadata.continue_.as_deref(), Some("next"));
        let names: Vec<_> = list.into_iter().map(|c| c.name_any()).collect();
        assert_eq!(names, ["a", "b"]);
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn create_and_replace_send_encoded_bodies() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments?dryRun=All");
            assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
            let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
            assert_eq!(body, json!({"apiVersion": "apps/v1", "kind": "Deployment", "metadata": {"name": "web"}}));
            send.send_response(ok(body));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PUT);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments/web");
            let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
            assert_eq!(body["metadata"]["resourceVersion"], "12");
            send.send_response(ok(body));
        });

        let deploys: Api<Deployment> = Api::default_namespaced(Client::new(mock_service, "default")).unwrap();
        let pp = PostParams {
            dry_run: true,
            ..PostParams::default()
        };
        let created = deploys.create(&pp, &Deployment::named("web")).await.unwrap();
        assert_eq!(created.name_any(), "web");

        let mut updated = created;
        updated.meta_mut().resource_version = Some("12".into());
        let replaced = deploys
            .replace("web", &PostParams::default(), &updated)
            .await
            .unwrap();
        assert_eq!(replaced.resource_version().as_deref(), Some("12"));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn patch_sends_content_type() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::PATCH);
            assert_eq!(
                request.uri().to_string(),
                "/apis/apps/v1/namespaces/default/deployments/web?force=true&fieldManager=ops"
            );
            assert_eq!(request.headers()[header::CONTENT_TYPE], "application/apply-patch+yaml");
            assert_eq!(request.body().as_slice(), br#"{"spec":{"replicas":4}}"#);
            send.send_response(ok(json!({"metadata": {"name": "web"}, "spec": {"replicas": 4}})));
        });

        let deploys: Api<Deployment> = Api::default_namespaced(Client::new(mock_service, "default")).unwrap();
        let patch = json!({"spec": {"replicas": 4}});
        let d = deploys
            .patch("web", &PatchParams::apply("ops").force(), &Patch::Apply(&patch))
            .await
            .unwrap();
        assert_eq!(d.spec.unwrap().replicas, Some(4));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn patch_validation_fails_before_sending() {
        let (mock_service, _handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let deploys: Api<Deployment> = Api::default_namespaced(Client::new(mock_service, "default")).unwrap();
        let pp = PatchParams {
            force: true,
            ..PatchParams::default()
        };
        let err = deploys
            .patch("web", &pp, &Patch::Merge(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BuildRequest(kubewire_core::request::Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_returns_object_or_status() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), Method::DELETE);
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments/web");
            let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
            assert_eq!(body["propagationPolicy"], "Foreground");
            send.send_response(ok(json!({
                "metadata": {"name": "web", "deletionTimestamp": "2025-01-01T00:00:00Z"}
            })));

            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.uri().to_string(), "/apis/apps/v1/namespaces/default/deployments?labelSelector=tier%3Dfront");
            send.send_response(ok(json!({"kind": "Status", "apiVersion": "v1", "status": "Success"})));
        });

        let deploys: Api<Deployment> = Api::default_namespaced(Client::new(mock_service, "default")).unwrap();
        let deleted = deploys.delete("web", &DeleteParams::foreground()).await.unwrap();
        let deploy = deleted.left().expect("object while deletion is pending");
        assert!(deploy.meta().and_then(|m| m.deletion_timestamp).is_some());

        let gone = deploys
            .delete_collection(&DeleteParams::default(), &ListParams::default().labels("tier=front"))
            .await
            .unwrap();
        assert!(gone.right().unwrap().is_success());
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn watch_decodes_buffered_events() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(
                request.uri().to_string(),
                "/api/v1/namespaces/db/persistentvolumeclaims?watch=true&timeoutSeconds=5&allowWatchBookmarks=true&resourceVersion=10"
            );
            let body = [
                json!({"type": "ADDED", "object": {"metadata": {"name": "a", "resourceVersion": "11"}}}),
                json!({"type": "BOOKMARK", "object": {"metadata": {"resourceVersion": "12"}}}),
            ]
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
            send.send_response(Response::new(Bytes::from(body + "\n")));
        });

        let claims: Api<PersistentVolumeClaim> = Api::namespaced(Client::new(mock_service, "default"), "db").unwrap();
        let events = claims
            .watch(&WatchParams::default().timeout(5), "10")
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WatchEvent::Added(c) if c.name_any() == "a"));
        assert!(matches!(&events[1], WatchEvent::Bookmark(b) if b.resource_version() == Some("12")));
        spawned.await.unwrap();
    }

    #[test]
    fn bodies_use_wire_keys() {
        let deploy: Deployment = codec::from_str("metadata:\n  name: web\nspec:\n  minReadySeconds: 5\n").unwrap();
        let body = super::encode_body(&deploy).unwrap();
        assert_eq!(body, br#"{"metadata":{"name":"web"},"spec":{"minReadySeconds":5}}"#);
    }
}
