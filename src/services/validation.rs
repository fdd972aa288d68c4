use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::BookingError;
use crate::models::{Booking, BookingForm, ServiceCatalog, ServiceId, TimeSlot};

pub const MAX_INPUT_LENGTH: usize = 1000;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 100;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]{7,20}$").expect("valid phone regex"))
}

fn script_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<script|javascript:|on\w+=").expect("valid script regex"))
}

/// Turns a raw form into a booking, or names the first field that is
/// missing or malformed. Required fields are checked in form order.
pub fn validate_form(
    form: &BookingForm,
    catalog: &ServiceCatalog,
    time_slots: &[TimeSlot],
    today: NaiveDate,
) -> Result<Booking, BookingError> {
    let date = required("date", &form.date)?;
    let service = required("service", &form.service)?;
    let time = required("time", &form.time)?;
    let name = required("name", &form.name)?;
    let phone = required("phone", &form.phone)?;
    let email = required("email", &form.email)?;
    let notes = form
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    for (field, value) in [
        ("date", date),
        ("service", service),
        ("time", time),
        ("name", name),
        ("phone", phone),
        ("email", email),
        ("notes", notes.unwrap_or_default()),
    ] {
        check_input(field, value)?;
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| BookingError::validation("date", format!("Invalid date: {date}")))?;
    if date < today {
        return Err(BookingError::validation("date", "Please choose a date that is not in the past."));
    }

    let service = ServiceId::new(service);
    if !catalog.contains(&service) {
        return Err(BookingError::validation(
            "service",
            format!("Unknown service: {service}"),
        ));
    }

    let time: TimeSlot = time
        .parse()
        .ok()
        .filter(|t| time_slots.contains(t))
        .ok_or_else(|| BookingError::validation("time", format!("Invalid time slot: {time}")))?;

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(BookingError::validation("name", "Name is too long"));
    }
    if !phone_regex().is_match(phone) {
        return Err(BookingError::validation("phone", "Invalid phone number format"));
    }
    if email.chars().count() > MAX_EMAIL_LENGTH || !email_regex().is_match(email) {
        return Err(BookingError::validation("email", "Invalid email format"));
    }

    Ok(Booking {
        date,
        service,
        time,
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        notes: notes.map(str::to_string),
    })
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, BookingError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BookingError::validation(field, format!("{field} is required")))
}

/// Length and script-injection screening applied to every submitted value.
pub fn check_input(field: &'static str, value: &str) -> Result<(), BookingError> {
    if value.chars().count() > MAX_INPUT_LENGTH {
        return Err(BookingError::validation(field, format!("Input for {field} is too long")));
    }
    if script_regex().is_match(value) {
        return Err(BookingError::validation(field, "Invalid input detected"));
    }
    Ok(())
}
