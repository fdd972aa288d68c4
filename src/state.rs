use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::db::LocalStore;
use crate::models::{BookingKey, ServiceCatalog, StudioConfig};
use crate::services::booking_store::BookingStore;
use crate::services::flow::BookingFlow;
use crate::services::notification::NotificationCenter;
use crate::services::rate_limit::RateLimiter;
use crate::services::submission::SubmissionClient;

/// Lock order: `flow`, then `store`, then `undelivered`.
pub struct AppState {
    pub config: AppConfig,
    pub studio: StudioConfig,
    pub catalog: ServiceCatalog,
    pub store: Mutex<BookingStore>,
    pub flow: Mutex<BookingFlow>,
    /// Committed bookings whose delivery failed or was abandoned. Only these
    /// may be resubmitted without a fresh commit.
    pub undelivered: Mutex<HashSet<BookingKey>>,
    pub notifications: NotificationCenter,
    pub rate_limiter: RateLimiter,
    pub submitter: Box<dyn SubmissionClient>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        studio: StudioConfig,
        backend: Arc<dyn LocalStore>,
        submitter: Box<dyn SubmissionClient>,
    ) -> Self {
        let store = BookingStore::load(backend.clone());
        let rate_limiter = RateLimiter::new(
            backend,
            config.rate_limit_max,
            config.rate_limit_window(),
        );
        Self {
            catalog: studio.catalog(),
            notifications: NotificationCenter::new(config.notification_dismiss_after()),
            store: Mutex::new(store),
            flow: Mutex::new(BookingFlow::new()),
            undelivered: Mutex::new(HashSet::new()),
            rate_limiter,
            submitter,
            studio,
            config,
        }
    }
}
