use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

mod chat;
mod health;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router().merge(chat::router()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
