//! Domain models exchanged with the backend.
//!
//! Field names follow the backend's JSON; optional fields default so that
//! partial payloads (list views, older endpoints) still deserialize.

mod bakery;
mod chat;
mod comment;
mod post;
mod profile;
mod user;

pub use bakery::{Bakery, Keywords};
pub use chat::{ChatFilters, ChatInitResponse, ChatMessage, ChatReply, ChatRole, InitialMessage};
pub use comment::Comment;
pub use post::{LikeState, NewPost, Post};
pub use profile::{
    FollowListKind, FollowListResponse, FollowToggleResponse, FollowUser, FollowVisibility,
    Profile, ProfilePayload, SearchResults,
};
pub use user::SessionUser;

use serde::Deserialize;

/// Image URLs arrive as `""` when unset.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|url| !url.trim().is_empty()))
}
