use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{BookingKey, ServiceCatalog, ServiceId, TimeSlot};
use crate::services::booking_store::BookingStore;

/// Read-only availability queries over a snapshot of the booking store.
///
/// Nothing is cached: every call reads the store as it is now, since a
/// commit may land between two renders.
pub struct AvailabilityEngine<'a> {
    catalog: &'a ServiceCatalog,
    store: &'a BookingStore,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockedSlot {
    pub time: TimeSlot,
    pub service: ServiceId,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotReport {
    pub date: NaiveDate,
    pub service: ServiceId,
    pub available: Vec<TimeSlot>,
    pub unavailable: Vec<BlockedSlot>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub selectable: bool,
    pub is_today: bool,
    pub booking_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub title: String,
    /// Weekday of the 1st, counting from Sunday = 0; the grid's leading blanks.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl<'a> AvailabilityEngine<'a> {
    pub fn new(catalog: &'a ServiceCatalog, store: &'a BookingStore) -> Self {
        Self { catalog, store }
    }

    pub fn is_available(&self, date: NaiveDate, service: &ServiceId, time: TimeSlot) -> bool {
        self.conflicting_service(date, service, time).is_none()
    }

    /// `all_times` filtered down to the free slots, order kept.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        service: &ServiceId,
        all_times: &[TimeSlot],
    ) -> Vec<TimeSlot> {
        all_times
            .iter()
            .copied()
            .filter(|t| self.is_available(date, service, *t))
            .collect()
    }

    /// First already-booked service sharing `service`'s room at this slot,
    /// in catalog order.
    pub fn conflicting_service(
        &self,
        date: NaiveDate,
        service: &ServiceId,
        time: TimeSlot,
    ) -> Option<ServiceId> {
        self.catalog
            .conflicts_for(service)
            .into_iter()
            .find(|s| self.store.contains(&BookingKey::new(date, s.clone(), time)))
    }

    pub fn booking_count_for_date(&self, date: NaiveDate) -> usize {
        self.store.count_on(date)
    }

    pub fn slot_report(
        &self,
        date: NaiveDate,
        service: &ServiceId,
        all_times: &[TimeSlot],
    ) -> SlotReport {
        let mut available = Vec::new();
        let mut unavailable = Vec::new();

        for &time in all_times {
            match self.conflicting_service(date, service, time) {
                None => available.push(time),
                Some(blocking) => unavailable.push(BlockedSlot {
                    time,
                    service_name: self.catalog.display_name(&blocking).to_string(),
                    service: blocking,
                }),
            }
        }

        let mut summary = format!("Available slots: {}", available.len());
        if !unavailable.is_empty() {
            let blocked = unavailable
                .iter()
                .map(|b| format!("{} ({})", b.time, b.service_name))
                .collect::<Vec<_>>()
                .join(", ");
            summary.push_str(&format!("\nUnavailable slots: {blocked}"));
        }

        SlotReport {
            date,
            service: service.clone(),
            available,
            unavailable,
            summary,
        }
    }

    /// Data for one month of the calendar grid. `None` for an invalid month.
    pub fn month_view(&self, year: i32, month: u32, today: NaiveDate) -> Option<MonthView> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        let days = first
            .iter_days()
            .take_while(|d| *d < next_month)
            .map(|date| CalendarDay {
                date,
                selectable: date >= today,
                is_today: date == today,
                booking_count: self.booking_count_for_date(date),
            })
            .collect();

        Some(MonthView {
            year,
            month,
            title: first.format("%B %Y").to_string(),
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }
}
