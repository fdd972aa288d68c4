pub mod calendar;
pub mod flow;
pub mod health;
pub mod notification;
