use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::errors::BookingError;
use crate::models::{Booking, BookingForm, BookingKey, FlowState, NotificationKind, ServiceId};
use crate::services::availability::{AvailabilityEngine, SlotReport};
use crate::services::submission::Submission;
use crate::state::AppState;

const CONFIRMED_TITLE: &str = "Booking Confirmed!";
const CONFIRMED_MESSAGE: &str = "Your booking request has been submitted successfully. \
     We will contact you shortly to confirm the details and payment.";
const FAILED_TITLE: &str = "Booking Failed";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses the page's `YYYY-MM-DD` value. A malformed date is reported like
/// any other form error.
pub fn parse_date(state: &AppState, raw: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        let e = BookingError::validation("date", format!("Invalid date: {raw}"));
        report_failure(state, &e);
        e
    })
}

pub fn select_date(state: &Arc<AppState>, date: NaiveDate) -> Result<FlowState, BookingError> {
    let mut flow = state.flow.lock().unwrap();
    if let Err(e) = flow.select_date(date, today()) {
        report_failure(state, &e);
        return Err(e);
    }
    Ok(flow.state().clone())
}

/// Moves the form to `SlotsRendered` for `service` and returns the slot
/// breakdown to draw.
pub fn select_service(state: &Arc<AppState>, service: ServiceId) -> Result<SlotReport, BookingError> {
    if !state.catalog.contains(&service) {
        let e = BookingError::validation("service", format!("Unknown service: {service}"));
        report_failure(state, &e);
        return Err(e);
    }

    let mut flow = state.flow.lock().unwrap();
    let store = state.store.lock().unwrap();
    let engine = AvailabilityEngine::new(&state.catalog, &store);

    if let Err(e) = flow.select_service(service.clone(), &engine, &state.studio.time_slots) {
        report_failure(state, &e);
        return Err(e);
    }

    let date = flow.state().selected_date().unwrap_or_else(today);
    Ok(engine.slot_report(date, &service, &state.studio.time_slots))
}

pub fn reset(state: &Arc<AppState>) -> Result<(), BookingError> {
    let result = state.flow.lock().unwrap().reset();
    if let Err(e) = &result {
        report_failure(state, e);
    }
    result
}

/// Validates, commits locally, then delivers to the external endpoint.
///
/// A delivery failure leaves the local commit in place: the slot stays
/// taken on this device even if the studio never hears about it. Submitting
/// the identical booking again re-attempts delivery without a second commit,
/// but only while its delivery is outstanding.
pub async fn submit_booking(state: &Arc<AppState>, form: BookingForm) -> Result<Booking, BookingError> {
    let slots = &state.studio.time_slots;

    let booking = {
        let mut flow = state.flow.lock().unwrap();
        let booking = match flow.submit(&form, &state.catalog, slots, today()) {
            Ok(b) => b,
            Err(e) => {
                report_failure(state, &e);
                return Err(e);
            }
        };

        let mut store = state.store.lock().unwrap();
        let key = booking.key();
        let retry = store.get(&key) == Some(&booking)
            && state.undelivered.lock().unwrap().contains(&key);
        if retry {
            tracing::info!(%key, "retrying delivery of committed booking");
        } else if let Err(e) = store.commit(&state.catalog, booking.clone()) {
            flow.return_to_slots(&AvailabilityEngine::new(&state.catalog, &store), slots);
            report_failure(state, &e);
            return Err(e);
        }
        booking
    };

    let in_flight = InFlight::new(state, booking.key());
    let outcome = deliver(state, &booking).await;
    in_flight.settle(outcome.is_ok());

    match outcome {
        Ok(()) => {
            tracing::info!(key = %booking.key(), "booking delivered");
            state
                .notifications
                .show(CONFIRMED_TITLE, CONFIRMED_MESSAGE, NotificationKind::Success);
            Ok(booking)
        }
        Err(e) => {
            tracing::warn!(
                key = %booking.key(),
                error = %e,
                "booking delivery failed, keeping local commit"
            );
            report_failure(state, &e);
            Err(e)
        }
    }
}

/// A committed booking waiting on delivery. Leaves the flow in a usable
/// state however the wait ends, including when the request future is
/// dropped mid-delivery.
struct InFlight<'a> {
    state: &'a AppState,
    key: BookingKey,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a AppState, key: BookingKey) -> Self {
        Self {
            state,
            key,
            settled: false,
        }
    }

    fn settle(mut self, delivered: bool) {
        self.finish(delivered);
    }

    fn finish(&mut self, delivered: bool) {
        self.settled = true;
        let state = self.state;
        let (Ok(mut flow), Ok(store), Ok(mut undelivered)) = (
            state.flow.lock(),
            state.store.lock(),
            state.undelivered.lock(),
        ) else {
            tracing::error!(key = %self.key, "state lock poisoned, flow left as is");
            return;
        };

        if delivered {
            undelivered.remove(&self.key);
            flow.confirm();
        } else {
            undelivered.insert(self.key.clone());
            flow.return_to_slots(
                &AvailabilityEngine::new(&state.catalog, &store),
                &state.studio.time_slots,
            );
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(key = %self.key, "submission abandoned during delivery");
            self.finish(false);
        }
    }
}

async fn deliver(state: &AppState, booking: &Booking) -> Result<(), BookingError> {
    let now = Local::now();
    state.rate_limiter.check(now.timestamp_millis())?;

    let submission = Submission::new(booking, &state.catalog, &now);
    match tokio::time::timeout(
        state.config.submission_timeout(),
        state.submitter.submit(&submission),
    )
    .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BookingError::SubmissionRejected(e.to_string())),
        Err(_) => Err(BookingError::SubmissionTimeout),
    }
}

/// Raises the blocking error notification for a failed form action.
pub fn report_failure(state: &AppState, error: &BookingError) {
    let message = if error.is_delivery_failure() {
        format!(
            "Sorry, there was an error submitting your booking: {error}. \
             Your slot is saved on this device; please try again or contact us directly."
        )
    } else {
        format!(
            "Sorry, there was an error submitting your booking: {error}. \
             Please try again or contact us directly."
        )
    };
    state
        .notifications
        .show(FAILED_TITLE, &message, NotificationKind::Error);
}
