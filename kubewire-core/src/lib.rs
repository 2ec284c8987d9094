//! Typed wire codec and request building blocks for Kubernetes API objects
//!
//! This crate holds everything the generated object model and the client have in common:
//! the [`codec`] that maps wire keys onto optional struct slots, the primitive wire types
//! ([`Time`], [`MicroTime`], [`Quantity`], [`IntOrString`]), [`PathTemplate`] and the
//! [`Request`] builder with its [`params`].
//!
//! The same items are re-exported from `kubewire` under `kubewire::core`.

pub mod codec;
pub use codec::{Decode, DecodeOptions, Encode, EncodeOptions, Format};

mod error;
pub use error::{DecodeError, EncodeError};

pub mod intstr;
pub use intstr::IntOrString;

pub mod params;

pub mod path;
pub use path::PathTemplate;

pub mod quantity;
pub use quantity::Quantity;

pub mod request;
pub use request::Request;

pub mod time;
pub use time::{MicroTime, Time};

pub mod value;
