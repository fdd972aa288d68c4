use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::LocalStore;
use crate::errors::BookingError;
use crate::models::{Booking, BookingKey, ServiceCatalog};
use crate::services::availability::AvailabilityEngine;

/// Local-store key holding the JSON map of confirmed bookings.
pub const BOOKINGS_KEY: &str = "studioBookings";

/// Confirmed bookings keyed by `date_service_time`, mirrored to a
/// [`LocalStore`] after every mutation.
///
/// The persisted record is overwritten wholesale on save; concurrent writers
/// are only guarded against by the re-check in [`BookingStore::commit`].
pub struct BookingStore {
    bookings: HashMap<String, Booking>,
    backend: Arc<dyn LocalStore>,
}

impl BookingStore {
    /// Reads the persisted bookings. Missing or unreadable data yields an
    /// empty store; this never fails.
    pub fn load(backend: Arc<dyn LocalStore>) -> Self {
        let bookings = match backend.get_item(BOOKINGS_KEY) {
            Ok(Some(raw)) => parse_bookings(&raw),
            Ok(None) => HashMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored bookings, starting empty");
                HashMap::new()
            }
        };

        tracing::info!(count = bookings.len(), "loaded bookings");
        Self { bookings, backend }
    }

    /// Records `booking` if its slot is still free for every conflicting
    /// service, then persists.
    pub fn commit(&mut self, catalog: &ServiceCatalog, booking: Booking) -> Result<(), BookingError> {
        let engine = AvailabilityEngine::new(catalog, self);
        if let Some(conflicting) =
            engine.conflicting_service(booking.date, &booking.service, booking.time)
        {
            tracing::info!(
                key = %booking.key(),
                conflicting = %conflicting,
                "commit rejected, slot already booked"
            );
            return Err(BookingError::SlotUnavailable {
                conflicting: Some(conflicting),
            });
        }

        let key = booking.key().to_string();
        self.bookings.insert(key.clone(), booking);

        if let Err(e) = self.save() {
            // Keep memory identical to what is on disk.
            self.bookings.remove(&key);
            tracing::error!(error = %e, key = %key, "failed to persist booking");
            return Err(BookingError::Storage(e.to_string()));
        }

        tracing::info!(key = %key, "booking committed");
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string(&self.bookings)?;
        self.backend.set_item(BOOKINGS_KEY, &json)
    }

    pub fn get(&self, key: &BookingKey) -> Option<&Booking> {
        self.bookings.get(&key.to_string())
    }

    pub fn contains(&self, key: &BookingKey) -> bool {
        self.bookings.contains_key(&key.to_string())
    }

    /// Number of stored keys starting with `date`'s prefix, any service.
    pub fn count_on(&self, date: NaiveDate) -> usize {
        let prefix = BookingKey::date_prefix(date);
        self.bookings.keys().filter(|k| k.starts_with(&prefix)).count()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Booking)> {
        self.bookings.iter()
    }
}

impl PartialEq for BookingStore {
    fn eq(&self, other: &Self) -> bool {
        self.bookings == other.bookings
    }
}

impl fmt::Debug for BookingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingStore")
            .field("bookings", &self.bookings)
            .finish_non_exhaustive()
    }
}

/// Unreadable JSON yields an empty map; a single unreadable record is
/// dropped on its own.
fn parse_bookings(raw: &str) -> HashMap<String, Booking> {
    let records = match serde_json::from_str::<Option<HashMap<String, serde_json::Value>>>(raw) {
        Ok(records) => records.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "stored bookings are corrupt, starting empty");
            return HashMap::new();
        }
    };

    records
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<Booking>(value) {
            Ok(booking) => Some((key, booking)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "dropping unreadable booking");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ServiceId;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booking(d: &str, service: &str, time: &str) -> Booking {
        Booking {
            date: date(d),
            service: ServiceId::from(service),
            time: time.parse().unwrap(),
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            notes: None,
        }
    }

    struct FailingStore;

    impl LocalStore for FailingStore {
        fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk unavailable")
        }

        fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = BookingStore::load(Arc::new(MemoryStore::new()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_item(BOOKINGS_KEY, "{not json").unwrap();
        let store = BookingStore::load(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set_item(BOOKINGS_KEY, r#"["a","b"]"#).unwrap();
        assert!(BookingStore::load(backend.clone()).is_empty());

        backend
            .set_item(BOOKINGS_KEY, r#"{"2024-06-01_room1-jamming_10:00":{"date":"June"}}"#)
            .unwrap();
        assert!(BookingStore::load(backend.clone()).is_empty());

        backend.set_item(BOOKINGS_KEY, "null").unwrap();
        assert!(BookingStore::load(backend).is_empty());
    }

    #[test]
    fn test_load_drops_only_unreadable_records() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_item(
                BOOKINGS_KEY,
                r#"{
                    "2024-06-01_room1-jamming_10:00":{"date":"2024-06-01","room":"room1-jamming","time":"10:00","name":"A","phone":"1","email":"a@b.co"},
                    "2024-06-01_room2-recording_09:00":{"date":"2024-06-01","room":"room2-recording","time":"9:00","name":"B","phone":"2","email":"b@c.co"}
                }"#,
            )
            .unwrap();

        let mut store = BookingStore::load(backend.clone());
        assert_eq!(store.len(), 1);
        assert!(store.contains(&booking("2024-06-01", "room1-jamming", "10:00").key()));

        store
            .commit(
                &ServiceCatalog::default(),
                booking("2024-06-02", "room2-recording", "11:00"),
            )
            .unwrap();
        let reloaded = BookingStore::load(backend);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(&booking("2024-06-01", "room1-jamming", "10:00").key()));
    }

    #[test]
    fn test_load_read_failure_is_empty() {
        let store = BookingStore::load(Arc::new(FailingStore));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_legacy_record() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_item(
                BOOKINGS_KEY,
                r#"{"2024-06-01_room1-jamming_10:00":{"date":"2024-06-01","room":"room1-jamming","time":"10:00","name":"A","phone":"1","email":"a@b.co","requests":""}}"#,
            )
            .unwrap();
        let store = BookingStore::load(backend);
        assert_eq!(store.len(), 1);
        let key = booking("2024-06-01", "room1-jamming", "10:00").key();
        assert!(store.contains(&key));
    }

    #[test]
    fn test_commit_persists() {
        let backend = Arc::new(MemoryStore::new());
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(backend.clone());

        store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap();

        let raw = backend.get_item(BOOKINGS_KEY).unwrap().unwrap();
        assert!(raw.contains("2024-06-01_room1-jamming_10:00"));
        assert_eq!(BookingStore::load(backend), store);
    }

    #[test]
    fn test_second_conflicting_commit_rejected() {
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(Arc::new(MemoryStore::new()));

        store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap();
        let err = store
            .commit(&catalog, booking("2024-06-01", "room1-gaming", "10:00"))
            .unwrap_err();

        assert_eq!(
            err,
            BookingError::SlotUnavailable {
                conflicting: Some(ServiceId::from("room1-jamming"))
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_service_twice_rejected() {
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(Arc::new(MemoryStore::new()));

        store
            .commit(&catalog, booking("2024-06-01", "room2-recording", "12:00"))
            .unwrap();
        assert!(store
            .commit(&catalog, booking("2024-06-01", "room2-recording", "12:00"))
            .is_err());
    }

    #[test]
    fn test_other_room_commit_allowed() {
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(Arc::new(MemoryStore::new()));

        store
            .commit(&catalog, booking("2024-06-01", "room2-recording", "10:00"))
            .unwrap();
        store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_stale_handle_last_writer_wins() {
        // Two handles over one backend, like two open tabs.
        let backend = Arc::new(MemoryStore::new());
        let catalog = ServiceCatalog::default();
        let mut first = BookingStore::load(backend.clone());
        let mut second = BookingStore::load(backend.clone());

        first
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap();
        // `second` never reloaded, so it cannot see the first commit and
        // last writer wins on disk.
        second
            .commit(&catalog, booking("2024-06-01", "room1-gaming", "11:00"))
            .unwrap();

        let reloaded = BookingStore::load(backend);
        assert_eq!(reloaded, second);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(Arc::new(FailingStore));

        let err = store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap_err();
        assert!(matches!(err, BookingError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_is_idempotent() {
        let backend = Arc::new(MemoryStore::new());
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(backend.clone());
        store
            .commit(&catalog, booking("2024-06-02", "room1-gaming", "15:00"))
            .unwrap();

        assert_eq!(BookingStore::load(backend.clone()), BookingStore::load(backend));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(backend.clone());
        store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "09:00"))
            .unwrap();
        let mut with_notes = booking("2024-06-01", "room2-recording", "09:00");
        with_notes.notes = Some("vocals only".to_string());
        store.commit(&catalog, with_notes).unwrap();

        store.save().unwrap();
        assert_eq!(BookingStore::load(backend), store);
    }

    #[test]
    fn test_count_on() {
        let catalog = ServiceCatalog::default();
        let mut store = BookingStore::load(Arc::new(MemoryStore::new()));
        store
            .commit(&catalog, booking("2024-06-01", "room1-jamming", "10:00"))
            .unwrap();
        store
            .commit(&catalog, booking("2024-06-01", "room2-recording", "10:00"))
            .unwrap();
        store
            .commit(&catalog, booking("2024-06-02", "room2-recording", "10:00"))
            .unwrap();

        assert_eq!(store.count_on(date("2024-06-01")), 2);
        assert_eq!(store.count_on(date("2024-06-02")), 1);
        assert_eq!(store.count_on(date("2024-06-03")), 0);
    }
}
