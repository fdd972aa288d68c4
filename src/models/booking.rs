use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ServiceId, TimeSlot};

/// A confirmed booking. Field names on the wire match the records the
/// booking widget has always persisted (`room`, `requests`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub date: NaiveDate,
    #[serde(rename = "room")]
    pub service: ServiceId,
    pub time: TimeSlot,
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "requests", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Booking {
    pub fn key(&self) -> BookingKey {
        BookingKey::new(self.date, self.service.clone(), self.time)
    }
}

/// Composite identity of a booking; rendered as `date_service_time`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookingKey {
    pub date: NaiveDate,
    pub service: ServiceId,
    pub time: TimeSlot,
}

impl BookingKey {
    pub fn new(date: NaiveDate, service: ServiceId, time: TimeSlot) -> Self {
        Self {
            date,
            service,
            time,
        }
    }

    /// Prefix shared by every key on `date`.
    pub fn date_prefix(date: NaiveDate) -> String {
        format!("{}_", date.format("%Y-%m-%d"))
    }
}

impl fmt::Display for BookingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.date.format("%Y-%m-%d"),
            self.service,
            self.time
        )
    }
}

/// Raw booking form as submitted by the page, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "room")]
    pub service: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "requests")]
    pub notes: Option<String>,
}
