//! Error handling in [`kubewire_client`][crate]
use thiserror::Error;

use kubewire_api::apimachinery::meta::v1::Status;
use kubewire_core::{request, DecodeError};

/// Possible errors when working with [`kubewire_client`][crate]
#[derive(Error, Debug)]
pub enum Error {
    /// The apiserver answered with a 4xx or 5xx status
    ///
    /// It's quite common to get a `410 Gone` when the `resourceVersion` is too old.
    #[error("ApiError: {0} ({0:?})")]
    Api(#[source] Status),

    /// The transport failed
    #[error("ServiceError: {0}")]
    Service(#[source] tower::BoxError),

    /// Http based error
    #[error("HttpError: {0}")]
    HttpError(#[source] http::Error),

    /// UTF-8 Error
    #[error("UTF-8 Error: {0}")]
    FromUtf8(#[source] std::string::FromUtf8Error),

    /// A response body did not match the expected type
    #[error("Error decoding response: {0}")]
    Decode(#[source] DecodeError),

    /// Failed to build request
    #[error("Failed to build request: {0}")]
    BuildRequest(#[source] request::Error),
}

impl Error {
    /// The HTTP code of an [`Error::Api`]
    pub fn api_code(&self) -> Option<i32> {
        match self {
            Self::Api(status) => status.code,
            _ => None,
        }
    }
}
