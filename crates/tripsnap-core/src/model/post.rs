use serde::{Deserialize, Serialize};

/// A post in a profile's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Single-image payloads; empty strings mean "no image".
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub writer_username: String,
    #[serde(default)]
    pub writer_nickname: String,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub like_count: u64,
}

impl Post {
    /// All image URLs, single-image field first.
    pub fn image_urls(&self) -> Vec<&str> {
        self.image
            .iter()
            .map(String::as_str)
            .chain(self.images.iter().map(String::as_str))
            .collect()
    }

    pub fn apply_like(&mut self, like: LikeState) {
        self.is_liked = like.is_liked;
        self.like_count = like.like_count;
    }
}

/// Like flag and counter as reported by a like-toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    #[serde(alias = "liked")]
    pub is_liked: bool,
    pub like_count: u64,
}

/// Input of the create-post flow; images are already data-URL encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}
