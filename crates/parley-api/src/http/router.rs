//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::{AppState, ChatStore, MessageStore, UserStore};

/// Build the complete API router with all routes and middleware.
pub fn build_router<U, C, M>(state: AppState<U, C, M>) -> Router
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/users", post(handlers::user::create_user::<U, C, M>))
        .route("/users/{id}", get(handlers::user::get_user::<U, C, M>))
        .route(
            "/chats",
            post(handlers::chat::create_chat::<U, C, M>)
                .get(handlers::chat::list_chats::<U, C, M>),
        )
        .route("/chats/{id}", get(handlers::chat::get_chat::<U, C, M>))
        .route(
            "/chats/{id}/messages",
            get(handlers::chat::list_messages::<U, C, M>)
                .post(handlers::chat::post_message::<U, C, M>),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
