//! User handlers.
//!
//! Responses use [`ApiUser`], which strips the password field from the
//! stored record.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use parley_types::user::{ApiUser, CreateUser};

use crate::http::error::AppError;
use crate::state::{AppState, ChatStore, MessageStore, UserStore};

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/v1/users - Register a new user.
pub async fn create_user<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<ApiUser>), AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if body.email.trim().is_empty() {
        return Err(AppError::Validation("email must not be empty".to_string()));
    }
    if body.password.is_empty() {
        return Err(AppError::Validation(
            "password must not be empty".to_string(),
        ));
    }

    let user = state
        .users
        .create(CreateUser {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiUser::from(user))))
}

/// GET /api/v1/users/{id} - Fetch one user.
pub async fn get_user<U, C, M>(
    State(state): State<AppState<U, C, M>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiUser>, AppError>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    let user = state
        .users
        .get(&id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(ApiUser::from(user)))
}
