//! Chat and message handlers.
//!
//! Every route here is scoped to the requesting owner via the [`OwnerId`]
//! extractor.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use parley_types::chat::Chat;
use parley_types::error::ChatError;
use parley_types::message::Message;

use crate::http::error::AppError;
use crate::http::extractors::OwnerId;
use crate::state::{AppState, ChatStore, MessageStore, UserStore};

#[derive(Debug, Deserialize)]
pub struct CreateChatBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub message: String,
}

/// POST /api/v1/chats - Create a chat owned by the requester.
pub async fn create_chat<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    OwnerId(owner_id): OwnerId,
    Json(body): Json<CreateChatBody>,
) -> Result<(StatusCode, Json<Chat>), AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    let chat = state.chat_service.create_chat(owner_id, body.name).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

/// GET /api/v1/chats - List the requester's chats.
pub async fn list_chats<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<Chat>>, AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    let chats = state.chat_service.list_chats(owner_id).await?;
    Ok(Json(chats))
}

/// GET /api/v1/chats/{id} - Fetch one chat, owner-scoped.
pub async fn get_chat<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<Chat>, AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    let chat = state
        .chat_service
        .get_chat(id, owner_id)
        .await?
        .ok_or(AppError::NotFound("Chat"))?;
    Ok(Json(chat))
}

/// GET /api/v1/chats/{id}/messages - Full ordered history.
pub async fn list_messages<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    // The chat must exist and belong to the requester.
    if state.chat_service.get_chat(id, owner_id).await?.is_none() {
        return Err(AppError::NotFound("Chat"));
    }

    let messages = state.chat_service.list_messages(id).await?;
    Ok(Json(messages))
}

/// POST /api/v1/chats/{id}/messages - Post a message and generate a reply.
pub async fn post_message<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Json(body): Json<PostMessageBody>,
) -> Result<(StatusCode, Json<Message>), AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    if body.message.trim().is_empty() {
        return Err(AppError::Validation(
            "message must not be empty".to_string(),
        ));
    }

    if state.chat_service.get_chat(id, owner_id).await?.is_none() {
        return Err(AppError::Chat(ChatError::ChatNotFound));
    }

    let reply = state
        .chat_service
        .post_message(id, body.message, &state.api_key)
        .await?;

    Ok((StatusCode::CREATED, Json(reply)))
}
