pub mod booking;
pub mod flow;
pub mod notification;
pub mod service;
pub mod slot;
pub mod studio;

pub use booking::{Booking, BookingForm, BookingKey};
pub use flow::FlowState;
pub use notification::{Notification, NotificationKind};
pub use service::{ServiceCatalog, ServiceDef, ServiceId};
pub use slot::TimeSlot;
pub use studio::StudioConfig;
