use chrono::NaiveDate;
use serde::Serialize;

use super::{Booking, ServiceId, TimeSlot};

/// Where the booking form currently is. Rejected and failed submissions
/// are reported as errors and land back in `SlotsRendered`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    DateSelected {
        date: NaiveDate,
    },
    SlotsRendered {
        date: NaiveDate,
        service: ServiceId,
        slots: Vec<TimeSlot>,
    },
    Submitting {
        booking: Booking,
    },
    Confirmed {
        booking: Booking,
    },
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::DateSelected { .. } => "date_selected",
            FlowState::SlotsRendered { .. } => "slots_rendered",
            FlowState::Submitting { .. } => "submitting",
            FlowState::Confirmed { .. } => "confirmed",
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        match self {
            FlowState::Idle => None,
            FlowState::DateSelected { date } | FlowState::SlotsRendered { date, .. } => Some(*date),
            FlowState::Submitting { booking } | FlowState::Confirmed { booking } => {
                Some(booking.date)
            }
        }
    }
}
