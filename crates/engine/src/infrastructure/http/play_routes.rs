//! The play endpoint: one POST carrying a batch of typed actions.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use storyloom_protocol::{ActionResult, PlayRequest};

use crate::infrastructure::state::AppState;

/// POST /api/play
///
/// Domain failures are already folded into per-action error entries by the
/// service; anything that reaches the error arm here is an internal failure
/// and fails the whole request.
pub async fn play(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlayRequest>,
) -> Result<Json<Vec<ActionResult>>, (StatusCode, String)> {
    match state.play.handle_batch(request).await {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            tracing::error!("Play batch failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ))
        }
    }
}
