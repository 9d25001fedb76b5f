use serde::{Deserialize, Serialize};

/// The authenticated account as returned by the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionUser {
    pub email: String,
    pub username: String,
    pub nickname: String,
    #[serde(deserialize_with = "super::empty_as_none")]
    pub profile_img: Option<String>,
}

impl SessionUser {
    /// Case-insensitive email comparison (used for the operator check).
    pub fn has_email(&self, email: &str) -> bool {
        !email.trim().is_empty() && self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}
