//! Application layer for the tripsnap client.
//!
//! The stores hold the client-side state the UI renders from and coordinate
//! the backend calls that change it. [`AppContext`] owns one instance of each
//! and ties their lifecycles to login and logout.

pub mod admin_service;
pub mod app_context;
pub mod bakery_cache;
pub mod bakery_store;
pub mod chat_store;
pub mod generation;
mod payload;
pub mod profile_store;
pub mod session_store;

#[cfg(test)]
mod test_support;

pub use admin_service::AdminService;
pub use app_context::AppContext;
pub use bakery_cache::BakeryCache;
pub use bakery_store::{BakeryModalState, BakeryStore, FetchOptions, OpenOptions};
pub use chat_store::{ChatState, ChatStore};
pub use generation::RequestGeneration;
pub use profile_store::{FollowModal, PostModal, ProfileState, ProfileStore};
pub use session_store::{SessionState, SessionStatus, SessionStore};
