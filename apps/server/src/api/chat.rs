use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    question: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    answer: String,
}

/// One blocking chat turn: question in, prose answer out.
async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let answer = state.agent.ask(&body.question).await?;
    Ok(Json(ChatResponse { answer }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(post_chat))
}
