//! Infrastructure layer: network transport, configuration loading and
//! image encoding for the tripsnap client.

pub mod config_service;
pub mod http_client;
pub mod image;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::http_client::HttpClient;
pub use crate::paths::TripsnapPaths;
