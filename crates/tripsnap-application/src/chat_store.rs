//! Recommendation chat transcript.

use crate::generation::RequestGeneration;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tripsnap_core::endpoints;
use tripsnap_core::model::{
    Bakery, ChatFilters, ChatInitResponse, ChatMessage, ChatReply, ChatRole, InitialMessage,
};
use tripsnap_core::{ApiRequest, ApiTransport, Result, TripsnapError, request_json};

/// Bot turn appended when a message could not be answered.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, something went wrong while preparing recommendations. Please try again.";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChatState {
    pub conversation_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub filters: Option<ChatFilters>,
    pub sending: bool,
}

impl ChatState {
    fn next_id(&self) -> u64 {
        self.messages.iter().map(|message| message.id).max().unwrap_or(0) + 1
    }

    fn push(&mut self, role: ChatRole, text: String, results: Option<Vec<Bakery>>) -> u64 {
        let id = self.next_id();
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            results,
        });
        id
    }
}

pub struct ChatStore {
    transport: Arc<dyn ApiTransport>,
    state: RwLock<ChatState>,
    /// Moves forward whenever the transcript is replaced.
    conversation: RequestGeneration,
}

impl ChatStore {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            state: RwLock::new(ChatState::default()),
            conversation: RequestGeneration::new(),
        }
    }

    pub async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.state.read().await.conversation_id.clone()
    }

    /// Replaces the conversation; seeded messages are numbered from 1.
    pub async fn set_initial_conversation(
        &self,
        conversation_id: impl Into<String>,
        initial_messages: Vec<InitialMessage>,
    ) {
        self.conversation.invalidate();
        let mut state = self.state.write().await;
        state.conversation_id = Some(conversation_id.into());
        state.sending = false;
        state.messages = initial_messages
            .into_iter()
            .zip(1..)
            .map(|(message, id)| ChatMessage {
                id,
                role: message.role,
                text: message.content,
                results: None,
            })
            .collect();
    }

    /// Appends a message with the next id (max + 1, or 1 when empty).
    ///
    /// # Returns
    ///
    /// The id assigned to the message.
    pub async fn append_message(
        &self,
        role: ChatRole,
        text: impl Into<String>,
        results: Option<Vec<Bakery>>,
    ) -> u64 {
        self.state.write().await.push(role, text.into(), results)
    }

    /// Forgets the conversation id and transcript.
    pub async fn reset(&self) {
        self.conversation.invalidate();
        *self.state.write().await = ChatState::default();
    }

    /// Starts a conversation from the keyword-selection answers.
    pub async fn start_conversation(&self, filters: ChatFilters) -> Result<String> {
        let filters = ChatFilters {
            preference: filters.preference.trim().to_string(),
            region: filters.region.trim().to_string(),
            dates: filters.dates.trim().to_string(),
            transport: filters.transport.trim().to_string(),
        };
        if filters.preference.is_empty() {
            return Err(TripsnapError::validation("Please choose what kind of bakery you like."));
        }

        self.reset().await;

        let request = ApiRequest::post(endpoints::CHAT_INIT).json(serde_json::to_value(&filters)?);
        let body: Value = request_json(&*self.transport, request).await?;
        let init: ChatInitResponse = serde_json::from_value(body)?;

        tracing::info!(
            "[ChatStore] Conversation {} started with {} seed messages",
            init.conversation_id,
            init.initial_messages.len()
        );

        let conversation_id = init.conversation_id.clone();
        self.set_initial_conversation(init.conversation_id, init.initial_messages)
            .await;
        self.state.write().await.filters = Some(filters);
        Ok(conversation_id)
    }

    /// Sends a user turn and appends the bot's answer.
    ///
    /// Any failure appends [`APOLOGY_MESSAGE`] as the bot turn and returns the
    /// error, so every user turn gets a reply in the transcript.
    pub async fn send_message(&self, text: &str) -> Result<ChatReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TripsnapError::validation("Please enter a message."));
        }

        let ticket = self.conversation.current();
        let conversation_id = {
            let mut state = self.state.write().await;
            state.push(ChatRole::User, text.to_string(), None);
            state.sending = true;
            state.conversation_id.clone()
        };

        let request = ApiRequest::post(endpoints::CHAT_MESSAGE).json(json!({
            "message": text,
            "conversation_id": conversation_id,
            "trigger": true,
        }));
        let result = async {
            let body: Value = request_json(&*self.transport, request).await?;
            Ok::<ChatReply, TripsnapError>(serde_json::from_value(body)?)
        }
        .await;

        if self.conversation.current() != ticket {
            tracing::debug!("[ChatStore] Dropping reply for a replaced conversation");
            return result;
        }

        let mut state = self.state.write().await;
        state.sending = false;
        match result {
            Ok(reply) => {
                if state.conversation_id.is_none() {
                    state.conversation_id = reply.conversation_id.clone();
                }
                let results = (!reply.results.is_empty()).then(|| reply.results.clone());
                let text = reply.llm_response.clone().unwrap_or_default();
                state.push(ChatRole::Bot, text, results);
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!("[ChatStore] Message failed: {}", e);
                state.push(ChatRole::Bot, APOLOGY_MESSAGE.to_string(), None);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;
    use tripsnap_core::{Method, RequestBody};

    fn bot(content: &str) -> InitialMessage {
        InitialMessage {
            role: ChatRole::Bot,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_contiguous_and_restart_after_reset() {
        let store = ChatStore::new(MockTransport::new());
        store
            .set_initial_conversation("1", vec![bot("hello"), bot("tell me more")])
            .await;
        let third = store.append_message(ChatRole::User, "croissants", None).await;
        assert_eq!(third, 3);

        let ids: Vec<u64> = store.messages().await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        store.reset().await;
        assert!(store.conversation_id().await.is_none());
        store.set_initial_conversation("2", vec![bot("again")]).await;
        assert_eq!(store.messages().await[0].id, 1);
    }

    #[tokio::test]
    async fn test_append_to_empty_starts_at_one() {
        let store = ChatStore::new(MockTransport::new());
        assert_eq!(store.append_message(ChatRole::User, "hi", None).await, 1);
        assert!(store.messages().await[0].results.is_none());
    }

    #[tokio::test]
    async fn test_start_conversation_seeds_transcript() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::CHAT_INIT,
            201,
            json!({
                "conversation_id": 42,
                "initial_messages": [
                    {"role": "bot", "content": "Selected: bread lines"},
                    {"role": "bot", "content": "Anything else?"}
                ]
            }),
        );
        let store = ChatStore::new(transport.clone());

        let filters = ChatFilters {
            preference: " bread lines ".into(),
            region: "Daejeon".into(),
            ..ChatFilters::default()
        };
        let id = store.start_conversation(filters).await.unwrap();
        assert_eq!(id, "42");

        let state = store.snapshot().await;
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].text, "Anything else?");
        assert_eq!(state.filters.unwrap().preference, "bread lines");

        let RequestBody::Json(body) = &transport.calls()[0].body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["preference"], "bread lines");
    }

    #[tokio::test]
    async fn test_blank_preference_is_rejected() {
        let transport = MockTransport::new();
        let store = ChatStore::new(transport.clone());
        let err = store.start_conversation(ChatFilters::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_attaches_results() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::CHAT_MESSAGE,
            200,
            json!({"llm_response": "Try these.", "results": [{"id": 3, "name": "Sungsimdang"}]}),
        );
        let store = ChatStore::new(transport.clone());
        store.set_initial_conversation("7", vec![bot("hi")]).await;

        store.send_message("recommend something").await.unwrap();

        let messages = store.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[2].role, ChatRole::Bot);
        assert_eq!(messages[2].results.as_ref().unwrap()[0].id, 3);

        let RequestBody::Json(body) = &transport.calls()[0].body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["conversation_id"], "7");
        assert_eq!(body["trigger"], true);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_attached() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::CHAT_MESSAGE,
            200,
            json!({"llm_response": "Could you narrow it down?", "results": []}),
        );
        let store = ChatStore::new(transport);

        store.send_message("bread").await.unwrap();
        assert!(store.messages().await[1].results.is_none());
    }

    #[tokio::test]
    async fn test_failure_appends_apology() {
        let transport = MockTransport::new();
        transport.fail(Method::Post, endpoints::CHAT_MESSAGE);
        let store = ChatStore::new(transport);

        let err = store.send_message("hello").await.unwrap_err();
        assert!(err.is_network());

        let messages = store.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, APOLOGY_MESSAGE);
        assert!(!store.snapshot().await.sending);
    }

    #[tokio::test]
    async fn test_adopts_server_conversation_id() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::CHAT_MESSAGE,
            200,
            json!({"llm_response": "ok", "results": [], "conversation_id": "99"}),
        );
        let store = ChatStore::new(transport);

        store.send_message("hi").await.unwrap();
        assert_eq!(store.conversation_id().await.as_deref(), Some("99"));
    }
}
