use super::{Bakery, Post};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Who may view an account's follower/following lists.
///
/// Older payloads spell the middle level `followers`; it is read as
/// [`FollowVisibility::FollowingOnly`] and always written back canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowVisibility {
    #[default]
    Public,
    #[serde(alias = "followers")]
    FollowingOnly,
    Private,
}

/// A user's public social record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub nickname: String,
    pub username: String,
    pub email: String,
    #[serde(deserialize_with = "super::empty_as_none")]
    pub profile_img: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    pub follow_visibility: FollowVisibility,
    pub is_owner: bool,
    pub is_following: bool,
}

/// Response of the profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub profile: Profile,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Response of the follow-toggle endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowToggleResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Which relationship list the follow modal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowListKind {
    Followers,
    Followings,
}

/// One row of a follower/following list or of user search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FollowUser {
    pub nickname: String,
    pub username: String,
    #[serde(deserialize_with = "super::empty_as_none")]
    pub profile_img: Option<String>,
}

/// Response of the follower/following list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FollowListResponse {
    pub users: Vec<FollowUser>,
    pub private: bool,
    pub detail: Option<String>,
}

/// Combined user + bakery search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchResults {
    pub users: Vec<FollowUser>,
    pub bakeries: Vec<Bakery>,
}
