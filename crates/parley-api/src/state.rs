//! Application state wiring resources, service, and provider together.
//!
//! The service layer is generic over the resource trait; `AppState` keeps
//! that genericity so one router works for every backend, and `main` pins
//! the type parameters once per `--backend` choice.

use std::sync::Arc;

use parley_core::chat::service::ChatService;
use parley_core::resource::Resource;
use parley_infra::llm::ProviderKind;
use parley_types::chat::{Chat, ChatFilter, ChatPatch, CreateChat};
use parley_types::message::{CreateMessage, Message, MessageFilter, MessagePatch};
use parley_types::user::{CreateUser, User, UserFilter, UserPatch};
use secrecy::SecretString;

/// Shorthand bound for a user-entity resource.
pub trait UserStore:
    Resource<Entity = User, Create = CreateUser, Filter = UserFilter, Patch = UserPatch> + 'static
{
}

impl<T> UserStore for T where
    T: Resource<Entity = User, Create = CreateUser, Filter = UserFilter, Patch = UserPatch>
        + 'static
{
}

/// Shorthand bound for a chat-entity resource.
pub trait ChatStore:
    Resource<Entity = Chat, Create = CreateChat, Filter = ChatFilter, Patch = ChatPatch> + 'static
{
}

impl<T> ChatStore for T where
    T: Resource<Entity = Chat, Create = CreateChat, Filter = ChatFilter, Patch = ChatPatch>
        + 'static
{
}

/// Shorthand bound for a message-entity resource.
pub trait MessageStore:
    Resource<Entity = Message, Create = CreateMessage, Filter = MessageFilter, Patch = MessagePatch>
    + 'static
{
}

impl<T> MessageStore for T where
    T: Resource<
            Entity = Message,
            Create = CreateMessage,
            Filter = MessageFilter,
            Patch = MessagePatch,
        > + 'static
{
}

/// Shared application state handed to every handler.
pub struct AppState<U, C, M>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    pub users: Arc<U>,
    pub chat_service: Arc<ChatService<C, M, ProviderKind>>,
    pub api_key: SecretString,
}

impl<U, C, M> AppState<U, C, M>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    pub fn new(users: U, chats: C, messages: M, provider: ProviderKind, api_key: SecretString) -> Self {
        Self {
            users: Arc::new(users),
            chat_service: Arc::new(ChatService::new(chats, messages, provider)),
            api_key,
        }
    }
}

// Manual impl: `#[derive(Clone)]` would demand Clone on the resource types
// even though only the Arcs are cloned.
impl<U, C, M> Clone for AppState<U, C, M>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            chat_service: Arc::clone(&self.chat_service),
            api_key: self.api_key.clone(),
        }
    }
}
