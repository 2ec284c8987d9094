//! Kubernetes API objects with a typed wire codec, and a thin client for their REST endpoints
//!
//! This crate re-exports the workspace crates under one roof:
//!
//! - [`core`]: the codec ([`core::codec`]), wire primitives such as [`core::Time`] and
//!   [`core::IntOrString`], path templates and the request builder
//! - [`api`]: the object model ([`api::api::apps::v1::Deployment`],
//!   [`api::apiextensions::v1::CustomResourceDefinition`], ...) and the [`Resource`] trait
//! - [`client`]: the [`Client`] over an injected transport and the typed [`Api`]
//!
//! # Decoding manifests
//!
//! Every field of every object is optional and bound to its exact wire key. Decoding
//! accepts JSON or YAML:
//!
//! ```
//! use kubewire::{api::api::apps::v1::Deployment, core::codec, ResourceExt};
//!
//! let manifest = r#"
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: web
//!   labels: {app: web}
//! spec:
//!   replicas: 0
//!   strategy:
//!     rollingUpdate: {maxSurge: "25%", maxUnavailable: 1}
//! "#;
//! let deploy: Deployment = codec::from_str(manifest).unwrap();
//! assert_eq!(deploy.labels()["app"], "web");
//! let spec = deploy.spec.as_ref().unwrap();
//! assert_eq!(spec.replicas, Some(0));
//! assert_eq!(spec.min_ready_seconds, None);
//!
//! let json = codec::to_string(&deploy).unwrap();
//! assert!(json.contains(r#""maxSurge":"25%","maxUnavailable":1"#));
//! ```
//!
//! # Talking to an apiserver
//!
//! The [`Client`] wraps any `tower::Service<http::Request<Vec<u8>>>` answering with
//! `http::Response<Bytes>`; connection handling and authentication live in that service.
//!
//! ```no_run
//! use kubewire::{api::api::coordination::v1::Lease, Api, Client, ResourceExt};
//!
//! # async fn wrapper(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let leases: Api<Lease> = Api::namespaced(client, "kube-system")?;
//! if let Some(lease) = leases.get_opt("kube-scheduler").await? {
//!     let holder = lease.spec.as_ref().and_then(|s| s.holder_identity.as_deref());
//!     println!("{} held by {:?}", lease.name_any(), holder);
//! }
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

macro_rules! cfg_client {
    ($($item:item)*) => {
        $(
            #[cfg_attr(docsrs, doc(cfg(feature = "client")))]
            #[cfg(feature = "client")]
            $item
        )*
    }
}

cfg_client! {
    /// Re-exports from [`kubewire_client`]
    #[doc(inline)]
    pub use kubewire_client as client;

    #[doc(inline)]
    pub use client::Api;
    #[doc(inline)]
    pub use client::Client;
    #[doc(inline)]
    pub use client::Error;
    /// Convenient alias for `Result<T, Error>`
    pub type Result<T, E = Error> = std::result::Result<T, E>;
}

/// Re-exports from [`kubewire_api`]
#[doc(inline)]
pub use kubewire_api as api;

/// Re-exports from [`kubewire_core`]
#[doc(inline)]
pub use kubewire_core as core;

pub use crate::api::{List, Resource, ResourceExt, WatchEvent};
