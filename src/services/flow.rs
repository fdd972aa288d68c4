use chrono::NaiveDate;

use crate::errors::BookingError;
use crate::models::{Booking, BookingForm, FlowState, ServiceCatalog, ServiceId, TimeSlot};
use crate::services::availability::AvailabilityEngine;
use crate::services::validation::validate_form;

/// The booking form's state machine, driven by discrete user events.
///
/// Transitions that fail leave the state untouched. The asynchronous parts
/// (commit and delivery) are driven from outside through
/// [`BookingFlow::return_to_slots`] and [`BookingFlow::confirm`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookingFlow {
    state: FlowState,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
        self.refuse_while_submitting("select a date")?;
        if date < today {
            return Err(BookingError::validation(
                "date",
                "Please choose a date that is not in the past.",
            ));
        }
        self.state = FlowState::DateSelected { date };
        Ok(())
    }

    /// Renders the open slots for `service` on the selected date. Can be
    /// repeated to switch services.
    pub fn select_service(
        &mut self,
        service: ServiceId,
        engine: &AvailabilityEngine<'_>,
        all_times: &[TimeSlot],
    ) -> Result<&[TimeSlot], BookingError> {
        let date = match &self.state {
            FlowState::DateSelected { date } | FlowState::SlotsRendered { date, .. } => *date,
            other => {
                return Err(BookingError::InvalidTransition {
                    state: other.as_str(),
                    action: "select a service",
                })
            }
        };
        self.render(date, service, engine, all_times);
        Ok(self.slots())
    }

    /// Validates the form and moves to `Submitting`. The form must carry the
    /// date and service currently on screen. Validation failures keep the
    /// current state.
    pub fn submit(
        &mut self,
        form: &BookingForm,
        catalog: &ServiceCatalog,
        all_times: &[TimeSlot],
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let FlowState::SlotsRendered { date, service, .. } = &self.state else {
            return Err(BookingError::InvalidTransition {
                state: self.state.as_str(),
                action: "submit a booking",
            });
        };

        let booking = validate_form(form, catalog, all_times, today)?;
        if booking.date != *date {
            return Err(BookingError::validation(
                "date",
                format!("The form is for {}, but {date} is selected", booking.date),
            ));
        }
        if booking.service != *service {
            return Err(BookingError::validation(
                "service",
                format!(
                    "The form is for {}, but {service} is selected",
                    booking.service
                ),
            ));
        }

        self.state = FlowState::Submitting {
            booking: booking.clone(),
        };
        Ok(booking)
    }

    /// Leaves `Submitting` after a rejected commit or a failed delivery,
    /// re-rendering slots for the booking's date and service.
    pub fn return_to_slots(&mut self, engine: &AvailabilityEngine<'_>, all_times: &[TimeSlot]) {
        let FlowState::Submitting { booking } = &self.state else {
            tracing::debug!(state = self.state.as_str(), "no submission in flight");
            return;
        };
        let (date, service) = (booking.date, booking.service.clone());
        self.render(date, service, engine, all_times);
    }

    pub fn confirm(&mut self) {
        let FlowState::Submitting { booking } = &self.state else {
            tracing::debug!(state = self.state.as_str(), "no submission in flight");
            return;
        };
        self.state = FlowState::Confirmed {
            booking: booking.clone(),
        };
    }

    pub fn reset(&mut self) -> Result<(), BookingError> {
        self.refuse_while_submitting("reset the form")?;
        self.state = FlowState::Idle;
        Ok(())
    }

    /// Slots currently on screen; empty outside `SlotsRendered`.
    pub fn slots(&self) -> &[TimeSlot] {
        match &self.state {
            FlowState::SlotsRendered { slots, .. } => slots,
            _ => &[],
        }
    }

    fn render(
        &mut self,
        date: NaiveDate,
        service: ServiceId,
        engine: &AvailabilityEngine<'_>,
        all_times: &[TimeSlot],
    ) {
        let slots = engine.available_slots(date, &service, all_times);
        self.state = FlowState::SlotsRendered {
            date,
            service,
            slots,
        };
    }

    fn refuse_while_submitting(&self, action: &'static str) -> Result<(), BookingError> {
        if matches!(self.state, FlowState::Submitting { .. }) {
            return Err(BookingError::InvalidTransition {
                state: self.state.as_str(),
                action,
            });
        }
        Ok(())
    }
}
