use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::ServiceId;
use crate::services::availability::{AvailabilityEngine, MonthView, SlotReport};
use crate::services::booking::today;
use crate::state::AppState;

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

// GET /api/calendar/:year/:month
pub async fn month_view(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthView>, AppError> {
    let store = state.store.lock().unwrap();
    AvailabilityEngine::new(&state.catalog, &store)
        .month_view(year, month, today())
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no such month: {year}-{month}")))
}

// GET /api/slots?date=YYYY-MM-DD&service=room1-jamming
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub service: String,
}

/// Read-only slot breakdown; does not touch the booking form.
pub async fn slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotReport>, AppError> {
    let date = parse_date(&query.date)?;
    let service = ServiceId::from(query.service.as_str());
    if !state.catalog.contains(&service) {
        return Err(AppError::NotFound(format!("unknown service '{service}'")));
    }

    let store = state.store.lock().unwrap();
    let report = AvailabilityEngine::new(&state.catalog, &store).slot_report(
        date,
        &service,
        &state.studio.time_slots,
    );
    Ok(Json(report))
}
