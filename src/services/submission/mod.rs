pub mod formspree;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::models::{Booking, ServiceCatalog};

/// Everything sent to the external booking endpoint for one booking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Submission {
    pub booking_date: String,
    pub room_service: String,
    pub time_slot: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub special_requests: String,
    pub booking_summary: String,
    pub booking_id: String,
}

impl Submission {
    /// `booking_id` is the submission time in milliseconds since the epoch.
    pub fn new<Tz: TimeZone>(
        booking: &Booking,
        catalog: &ServiceCatalog,
        submitted_at: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let booking_id = submitted_at.timestamp_millis().to_string();
        let requests = booking.notes.as_deref().unwrap_or("None");

        let booking_summary = format!(
            "BOOKING DETAILS:\n\
             ================\n\
             Date: {date}\n\
             Service: {service} ({label})\n\
             Time: {time}\n\
             Customer: {name}\n\
             Phone: {phone}\n\
             Email: {email}\n\
             Special Requests: {requests}\n\
             \n\
             Booking ID: {booking_id}\n\
             Submitted: {submitted}",
            date = booking.date.format("%Y-%m-%d"),
            service = booking.service,
            label = catalog.display_name(&booking.service),
            time = booking.time,
            name = booking.name,
            phone = booking.phone,
            email = booking.email,
            submitted = submitted_at.format("%Y-%m-%d %H:%M:%S"),
        );

        Self {
            booking_date: booking.date.format("%Y-%m-%d").to_string(),
            room_service: booking.service.to_string(),
            time_slot: booking.time.to_string(),
            customer_name: booking.name.clone(),
            customer_phone: booking.phone.clone(),
            customer_email: booking.email.clone(),
            special_requests: booking.notes.clone().unwrap_or_default(),
            booking_summary,
            booking_id,
        }
    }
}

/// Outbound delivery of a committed booking. An `Err` carries the message
/// to show the user verbatim.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, submission: &Submission) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceId;
    use chrono::{NaiveDate, Utc};

    fn booking(notes: Option<&str>) -> Booking {
        Booking {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            service: ServiceId::from("room2-recording"),
            time: "18:00".parse().unwrap(),
            name: "Ravi".to_string(),
            phone: "9876543210".to_string(),
            email: "ravi@example.com".to_string(),
            notes: notes.map(str::to_string),
        }
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_submission_fields() {
        let sub = Submission::new(
            &booking(Some("need a pop filter")),
            &ServiceCatalog::default(),
            &submitted_at(),
        );
        assert_eq!(sub.booking_date, "2024-06-01");
        assert_eq!(sub.room_service, "room2-recording");
        assert_eq!(sub.time_slot, "18:00");
        assert_eq!(sub.special_requests, "need a pop filter");
        assert_eq!(sub.booking_id, "1717070400000");
    }

    #[test]
    fn test_summary_contents() {
        let sub = Submission::new(&booking(None), &ServiceCatalog::default(), &submitted_at());
        assert!(sub.booking_summary.starts_with("BOOKING DETAILS:\n"));
        assert!(sub.booking_summary.contains("Date: 2024-06-01"));
        assert!(sub
            .booking_summary
            .contains("Service: room2-recording (Recording Studio)"));
        assert!(sub.booking_summary.contains("Time: 18:00"));
        assert!(sub.booking_summary.contains("Customer: Ravi"));
        assert!(sub.booking_summary.contains("Special Requests: None"));
        assert!(sub.booking_summary.contains("Booking ID: 1717070400000"));
        assert!(sub.booking_summary.contains("Submitted: 2024-05-30 12:00:00"));
        assert_eq!(sub.special_requests, "");
    }
}
