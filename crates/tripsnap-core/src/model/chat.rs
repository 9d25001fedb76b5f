use super::Bakery;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

/// One transcript entry. `id` is assigned client-side, contiguous from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    /// Recommended bakeries rendered inline instead of as plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Bakery>>,
}

/// Keyword-selection answers sent to conversation init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatFilters {
    pub preference: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub transport: String,
}

/// A seed message returned by conversation init.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialMessage {
    pub role: ChatRole,
    #[serde(alias = "text")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInitResponse {
    #[serde(deserialize_with = "id_as_string")]
    pub conversation_id: String,
    #[serde(default)]
    pub initial_messages: Vec<InitialMessage>,
}

/// Response of the message-send endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatReply {
    pub llm_response: Option<String>,
    pub results: Vec<Bakery>,
    #[serde(deserialize_with = "optional_id_as_string")]
    pub conversation_id: Option<String>,
    /// The server stored the turn without running a recommendation.
    pub saved: bool,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id_as_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("conversation_id must be a string or number"))
}

fn optional_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}
