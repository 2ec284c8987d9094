//! A basic API client for interacting with the Kubernetes API
//!
//! The [`Client`] turns error statuses into [`Error::Api`] and decodes bodies with the
//! typed codec. Use it through [`Api`](crate::Api) for structured access.
use bytes::Bytes;
use either::{Either, Left, Right};
use futures::future::BoxFuture;
use http::{Request, Response, StatusCode};
use tower::{buffer::Buffer, util::BoxService, BoxError, Service, ServiceExt};

use kubewire_api::{apimachinery::meta::v1::Status, WatchEvent};
use kubewire_core::{
    codec::{self, Decode},
    value::Value,
    DecodeOptions,
};

use crate::{Error, Result};

/// Client for a Kubernetes apiserver reachable through an injected transport.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Client {
    // - `Buffer` for cheap clone
    // - `BoxService` for dynamic response future type
    inner: Buffer<Request<Vec<u8>>, BoxFuture<'static, Result<Response<Bytes>, BoxError>>>,
    default_ns: String,
    decode_options: DecodeOptions,
}

impl Client {
    /// Create a [`Client`] over a transport `Service`.
    ///
    /// The service receives requests with path-only URIs; prefixing the server address is
    /// up to the transport.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// ```
    /// # async fn doc() {
    /// use bytes::Bytes;
    /// use http::{Request, Response};
    /// use kubewire_client::Client;
    ///
    /// let transport = tower::service_fn(|_: Request<Vec<u8>>| async {
    ///     Ok::<_, std::convert::Infallible>(Response::new(Bytes::from_static(b"{}")))
    /// });
    /// let client = Client::new(transport, "default");
    /// # }
    /// ```
    pub fn new<S, T>(service: S, default_namespace: T) -> Self
    where
        S: Service<Request<Vec<u8>>, Response = Response<Bytes>> + Send + 'static,
        S::Future: Send + 'static,
        S::Error: Into<BoxError>,
        T: Into<String>,
    {
        let service = service.map_err(Into::into);
        Self {
            inner: Buffer::new(BoxService::new(service), 1024),
            default_ns: default_namespace.into(),
            decode_options: DecodeOptions::default(),
        }
    }

    /// Decode response bodies with `options` instead of the defaults
    #[must_use]
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    /// The options used to decode response bodies
    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    pub(crate) fn default_ns(&self) -> &str {
        &self.default_ns
    }

    /// Perform a raw HTTP request against the API and return the raw response back.
    pub async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>> {
        tracing::trace!(method = %request.method(), uri = %request.uri(), "sending request");
        let mut svc = self.inner.clone();
        let res = svc
            .ready()
            .await
            .map_err(Error::Service)?
            .call(request)
            .await
            .map_err(Error::Service)?;
        Ok(res)
    }

    /// Perform a raw HTTP request against the API and decode the response body to some
    /// known type.
    pub async fn request<T: Decode>(&self, request: Request<Vec<u8>>) -> Result<T> {
        let text = self.request_text(request).await?;
        self.decode(&text)
    }

    /// Perform a raw HTTP request against the API and get back the response
    /// as a string
    pub async fn request_text(&self, request: Request<Vec<u8>>) -> Result<String> {
        let res = self.send(request).await?;
        let status = res.status();
        tracing::trace!(%status, "received response");
        let text = String::from_utf8(res.into_body().to_vec()).map_err(Error::FromUtf8)?;
        handle_api_errors(&text, status, &self.decode_options)?;
        Ok(text)
    }

    /// Perform a raw HTTP request against the API and get back either a decoded object
    /// or a [`Status`] object.
    pub async fn request_status<T: Decode>(&self, request: Request<Vec<u8>>) -> Result<Either<T, Status>> {
        let text = self.request_text(request).await?;
        let value: Value = self.decode(&text)?;
        if value["kind"] == "Status" {
            tracing::trace!("Status from {}", text);
            Ok(Right(self.decode_value(value, &text)?))
        } else {
            Ok(Left(self.decode_value(value, &text)?))
        }
    }

    /// Perform a raw request and decode the newline separated [`WatchEvent`]s of the
    /// complete response body
    pub async fn request_events<T: Decode>(&self, request: Request<Vec<u8>>) -> Result<Vec<WatchEvent<T>>> {
        let text = self.request_text(request).await?;
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.decode(line))
            .collect()
    }

    fn decode<T: Decode>(&self, text: &str) -> Result<T> {
        codec::from_slice_with(text.as_bytes(), &self.decode_options).map_err(|e| {
            tracing::warn!("{}, {:?}", text, e);
            Error::Decode(e)
        })
    }

    fn decode_value<T: Decode>(&self, value: Value, text: &str) -> Result<T> {
        codec::from_value_with(value, &self.decode_options).map_err(|e| {
            tracing::warn!("{}, {:?}", text, e);
            Error::Decode(e)
        })
    }
}

/// Kubernetes returned error handling
///
/// Either the body is a `Status` from the apiserver, or something from a proxy in front
/// of it, in which case a `Status` is made up from the HTTP code.
fn handle_api_errors(text: &str, s: StatusCode, options: &DecodeOptions) -> Result<()> {
    if s.is_client_error() || s.is_server_error() {
        match codec::from_slice_with::<Status>(text.as_bytes(), options) {
            Ok(status) if status.kind.as_deref() == Some("Status") => {
                tracing::debug!("Unsuccessful: {:?}", status);
                Err(Error::Api(status))
            }
            _ => {
                tracing::warn!("Unsuccessful data error parse: {}", text);
                let status = Status::failure(&format!("{:?}", text), "Failed to parse error data")
                    .with_code(s.as_u16());
                tracing::debug!("Unsuccessful: {:?} (reconstruct)", status);
                Err(Error::Api(status))
            }
        }
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::pin_mut;
    use serde_json::json;
    use tower_test::mock;

    fn respond(status: u16, body: serde_json::Value) -> Response<Bytes> {
        Response::builder()
            .status(status)
            .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn status_bodies_become_api_errors() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(respond(
                409,
                json!({
                    "kind": "Status",
                    "apiVersion": "v1",
                    "status": "Failure",
                    "message": "leases.coordination.k8s.io \"a\" already exists",
                    "reason": "AlreadyExists",
                    "code": 409
                }),
            ));
        });
        let client = Client::new(mock_service, "default");
        let err = client
            .request::<Value>(Request::post("/x").body(vec![]).unwrap())
            .await
            .unwrap_err();
        match err {
            Error::Api(status) => {
                assert_eq!(status.code, Some(409));
                assert_eq!(status.reason.as_deref(), Some("AlreadyExists"));
                assert!(status.is_failure());
            }
            other => panic!("unexpected {other:?}"),
        }
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn opaque_error_bodies_are_reconstructed() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(
                Response::builder()
                    .status(502)
                    .body(Bytes::from_static(b"<html>bad gateway</html>"))
                    .unwrap(),
            );
        });
        let client = Client::new(mock_service, "default");
        let err = client
            .request_text(Request::get("/x").body(vec![]).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.api_code(), Some(502));
        match err {
            Error::Api(status) => assert_eq!(status.reason.as_deref(), Some("Failed to parse error data")),
            other => panic!("unexpected {other:?}"),
        }
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn transport_errors_are_service_errors() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_error(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"));
        });
        let client = Client::new(mock_service, "default");
        let err = client.send(Request::get("/x").body(vec![]).unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Service(_)));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn decode_options_apply_to_responses() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(respond(200, json!({"metadata": {"name": "deep"}})));
        });
        let client = Client::new(mock_service, "default").with_decode_options(DecodeOptions::default().max_depth(2));
        let err = client
            .request::<Status>(Request::get("/x").body(vec![]).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(kubewire_core::DecodeError::DepthExceeded { limit: 2, .. })));
        spawned.await.unwrap();
    }

    #[tokio::test]
    async fn status_or_object() {
        let (mock_service, handle) = mock::pair::<Request<Vec<u8>>, Response<Bytes>>();
        let spawned = tokio::spawn(async move {
            pin_mut!(handle);
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(respond(200, json!({"kind": "Status", "status": "Success"})));
            let (_, send) = handle.next_request().await.expect("service not called");
            send.send_response(respond(200, json!({"kind": "Thing", "answer": 42})));
        });
        let client = Client::new(mock_service, "default");
        let first = client
            .request_status::<Value>(Request::delete("/x").body(vec![]).unwrap())
            .await
            .unwrap();
        assert!(matches!(first, Right(ref s) if s.is_success()));
        let second = client
            .request_status::<Value>(Request::delete("/y").body(vec![]).unwrap())
            .await
            .unwrap();
        assert_eq!(second.left().unwrap()["answer"], 42);
        spawned.await.unwrap();
    }
}
