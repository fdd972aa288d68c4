use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Notification;
use crate::state::AppState;

// GET /api/notification
pub async fn current(State(state): State<Arc<AppState>>) -> Json<Option<Notification>> {
    Json(state.notifications.current())
}

// POST /api/notification/:id/dismiss
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.notifications.dismiss(id) {
        return Err(AppError::NotFound(format!("notification {id} is not showing")));
    }
    Ok(Json(json!({ "dismissed": id })))
}
