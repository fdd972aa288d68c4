pub mod availability;
pub mod booking;
pub mod booking_store;
pub mod flow;
pub mod notification;
pub mod rate_limit;
pub mod submission;
pub mod validation;
