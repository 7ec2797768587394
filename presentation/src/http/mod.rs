//! JSON HTTP API
//!
//! [`router`] wires every handler onto an axum [`Router`] over a shared
//! [`AppState`]. Errors from any layer surface as [`ApiError`] responses.

pub mod chat;
pub mod documents;
pub mod error;
pub mod health;
pub mod providers;
pub mod query;
pub mod search;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// `cors` adds a permissive CORS layer for browser clients on other origins.
pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/api/query/translate", post(query::translate))
        .route("/api/query", post(query::run_query))
        .route("/api/salesforce/describe/{object}", get(query::describe))
        .route("/api/search", post(search::search))
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/documents",
            post(documents::upload).get(documents::list),
        )
        .route("/api/documents/ask", post(documents::ask))
        .route("/api/documents/{filename}", delete(documents::delete))
        .route(
            "/api/providers",
            get(providers::status)
                .post(providers::register)
                .delete(providers::teardown),
        )
        .route("/api/tools", get(providers::tools))
        .route("/api/tools/call", post(providers::call))
        .with_state(state);

    let app = if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };
    app.layer(TraceLayer::new_for_http())
}
