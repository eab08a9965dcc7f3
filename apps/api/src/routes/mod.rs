pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{actions, context, document, export, llm_client, profile};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Agent actions
        .route("/api/v1/actions", get(actions::handlers::handle_list_actions))
        .route(
            "/api/v1/actions/:name",
            post(actions::handlers::handle_invoke_action),
        )
        // Document + readable context
        .route(
            "/api/v1/document",
            get(document::handlers::handle_get_document),
        )
        .route("/api/v1/context", get(context::handlers::handle_get_context))
        .route(
            "/api/v1/context/document",
            get(context::handlers::handle_get_document_snapshot),
        )
        .route(
            "/api/v1/context/fields/:field",
            get(context::handlers::handle_get_field_snapshot),
        )
        // Exports
        .route(
            "/api/v1/exports/:file",
            get(export::handlers::handle_download),
        )
        // Profile + chat
        .route("/api/v1/profile", get(profile::handlers::handle_get_profile))
        .route("/api/v1/chat", post(llm_client::handlers::handle_chat))
        .with_state(state)
}
