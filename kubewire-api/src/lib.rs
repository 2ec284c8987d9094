//! Kubernetes API objects with explicit wire key tables
//!
//! Every object is a plain struct of optional slots declared with
//! [`wire_object!`](kubewire_core::wire_object). Each slot is bound to the exact key it has
//! on the wire, so names like `$ref`, `x-kubernetes-int-or-string` or `continue` need no
//! renaming rules. Objects decode from JSON or YAML through [`kubewire_core::codec`].
//!
//! ```
//! use kubewire_api::{api::apps::v1::Deployment, Resource, ResourceExt};
//! use kubewire_core::codec;
//!
//! let deploy: Deployment = codec::from_str("
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: web
//! spec:
//!   replicas: 0
//! ").unwrap();
//! assert_eq!(deploy.name_any(), "web");
//! assert_eq!(deploy.spec.unwrap().replicas, Some(0));
//! assert_eq!(Deployment::URL_PATH_SEGMENT, "deployments");
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;

pub mod api;

pub mod apiextensions;

pub mod apimachinery;

mod list;
pub use list::List;

mod resource;
pub use resource::{ClusterResourceScope, NamespaceResourceScope, Resource, ResourceExt, ResourceScope};

pub mod watch;
pub use watch::WatchEvent;
