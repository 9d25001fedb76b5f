//! Domain layer of the tripsnap client.
//!
//! Models, the shared error type, configuration shape, the backend's
//! endpoint contract and the [`transport::ApiTransport`] seam. Nothing here
//! performs I/O.

pub mod config;
pub mod data_url;
pub mod endpoints;
pub mod error;
pub mod model;
pub mod transport;

pub use config::ClientConfig;
pub use error::{Result, TripsnapError};
pub use transport::{
    ApiRequest, ApiResponse, ApiTransport, Method, MultipartPart, RequestBody, request_json,
    request_json_or_absent,
};
