use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingForm, FlowState, ServiceId};
use crate::services::availability::SlotReport;
use crate::services::booking;
use crate::state::AppState;

// GET /api/flow
pub async fn get_flow(State(state): State<Arc<AppState>>) -> Json<FlowState> {
    Json(state.flow.lock().unwrap().state().clone())
}

// POST /api/flow/date
#[derive(Deserialize)]
pub struct SelectDateRequest {
    pub date: String,
}

pub async fn select_date(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectDateRequest>,
) -> Result<Json<FlowState>, AppError> {
    let date = booking::parse_date(&state, &req.date)?;
    Ok(Json(booking::select_date(&state, date)?))
}

// POST /api/flow/service
#[derive(Deserialize)]
pub struct SelectServiceRequest {
    #[serde(alias = "room")]
    pub service: String,
}

pub async fn select_service(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectServiceRequest>,
) -> Result<Json<SlotReport>, AppError> {
    let service = ServiceId::from(req.service.trim());
    Ok(Json(booking::select_service(&state, service)?))
}

// POST /api/flow/submit
#[derive(Serialize)]
pub struct SubmitResponse {
    pub booking: Booking,
    pub key: String,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(form): Json<BookingForm>,
) -> Result<Json<SubmitResponse>, AppError> {
    let booking = booking::submit_booking(&state, form).await?;
    Ok(Json(SubmitResponse {
        key: booking.key().to_string(),
        booking,
    }))
}

// POST /api/flow/reset
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<FlowState>, AppError> {
    booking::reset(&state)?;
    Ok(Json(FlowState::Idle))
}
