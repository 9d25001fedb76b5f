use serde::{Deserialize, Serialize};

/// A comment on a post or a bakery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "user_nickname", alias = "nickname")]
    pub writer_nickname: String,
    #[serde(default)]
    pub is_owner: bool,
    /// Server-formatted (`%Y-%m-%d %H:%M`), kept as text.
    #[serde(default)]
    pub created_at: Option<String>,
}
