//! Typed Kubernetes REST endpoints over a pluggable transport
//!
//! The [`Client`] wraps any [`tower::Service`] that turns an `http::Request<Vec<u8>>` into
//! an `http::Response<Bytes>`. Connecting, authenticating and retrying are the transport's
//! business; the client only maps error statuses and decodes bodies.
//!
//! [`Api`] adds one method per REST endpoint of a [`Resource`](kubewire_api::Resource).
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub use api::Api;

pub mod client;
pub use client::Client;

pub mod error;
pub use error::Error;

/// Convenient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
