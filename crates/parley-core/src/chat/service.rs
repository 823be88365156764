//! Chat service orchestrating persistence and reply generation.
//!
//! `ChatService` coordinates the chat and message resources with the LLM
//! provider: posting a user message persists it, reads the full ordered
//! history, calls the provider, and persists the returned text as a new
//! message. Each post runs this chain strictly sequentially; concurrency
//! arises only across independent requests.
//!
//! This is also the pipeline's error boundary: every provider failure
//! collapses into the single [`ChatError::ProviderUnavailable`] kind, with
//! the original diagnostic logged rather than exposed.

use parley_types::chat::{Chat, ChatFilter, ChatPatch, CreateChat};
use parley_types::error::ChatError;
use parley_types::message::{CreateMessage, Message, MessageFilter, MessagePatch, MessageRole};
use secrecy::SecretString;
use tracing::warn;
use uuid::Uuid;

use crate::llm::LlmProvider;
use crate::resource::Resource;

/// Instruction sent with every provider request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant who answers to the user messages";

/// Orchestrates chat persistence and reply generation.
///
/// Generic over the resource and provider traits so parley-core never
/// depends on parley-infra; the concrete backends are pinned once in the
/// API layer's state.
pub struct ChatService<C, M, P>
where
    C: Resource<Entity = Chat, Create = CreateChat, Filter = ChatFilter, Patch = ChatPatch>,
    M: Resource<
            Entity = Message,
            Create = CreateMessage,
            Filter = MessageFilter,
            Patch = MessagePatch,
        >,
    P: LlmProvider,
{
    chats: C,
    messages: M,
    provider: P,
}

impl<C, M, P> ChatService<C, M, P>
where
    C: Resource<Entity = Chat, Create = CreateChat, Filter = ChatFilter, Patch = ChatPatch>,
    M: Resource<
            Entity = Message,
            Create = CreateMessage,
            Filter = MessageFilter,
            Patch = MessagePatch,
        >,
    P: LlmProvider,
{
    /// Create a new chat service over the given resources and provider.
    pub fn new(chats: C, messages: M, provider: P) -> Self {
        Self {
            chats,
            messages,
            provider,
        }
    }

    /// Create a chat owned by the given user.
    pub async fn create_chat(&self, owner_id: Uuid, name: String) -> Result<Chat, ChatError> {
        let chat = self.chats.create(CreateChat { name, owner_id }).await?;
        Ok(chat)
    }

    /// List every chat owned by the given user.
    pub async fn list_chats(&self, owner_id: Uuid) -> Result<Vec<Chat>, ChatError> {
        let filter = ChatFilter {
            owner_id: Some(owner_id),
            ..Default::default()
        };
        Ok(self.chats.find_all(&filter).await?)
    }

    /// Fetch one chat scoped to its owner. Both filter fields must match.
    pub async fn get_chat(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Chat>, ChatError> {
        let filter = ChatFilter {
            id: Some(id),
            owner_id: Some(owner_id),
        };
        Ok(self.chats.find(&filter).await?)
    }

    /// Full ordered history for a chat, ascending by creation time.
    pub async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, ChatError> {
        let filter = MessageFilter {
            chat_id: Some(chat_id),
            ..Default::default()
        };
        Ok(self.messages.find_all(&filter).await?)
    }

    /// Post a user message and generate the provider's reply.
    ///
    /// Persists the user message, reads the full history (which now ends
    /// with it), calls the provider once, and persists the reply. Returns
    /// the persisted reply message.
    pub async fn post_message(
        &self,
        chat_id: Uuid,
        content: String,
        api_key: &SecretString,
    ) -> Result<Message, ChatError> {
        // The owning chat must exist before any message is written.
        if self.chats.get(&chat_id).await?.is_none() {
            return Err(ChatError::ChatNotFound);
        }

        self.messages
            .create(CreateMessage {
                chat_id,
                role: MessageRole::User,
                content,
            })
            .await?;

        let history = self.list_messages(chat_id).await?;

        let reply = match self
            .provider
            .generate(SYSTEM_PROMPT, &history, api_key)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                // Collapse every provider failure into one coarse kind;
                // the detail stays in the logs only.
                warn!(provider = self.provider.name(), error = %err, "reply generation failed");
                return Err(ChatError::ProviderUnavailable);
            }
        };

        // TODO: confirm whether replies should carry the assistant role.
        // The deployed behavior records them as `user`, so history sent to
        // the provider never contains an assistant turn.
        let message = self
            .messages
            .create(CreateMessage {
                chat_id,
                role: MessageRole::User,
                content: reply,
            })
            .await?;

        Ok(message)
    }
}
