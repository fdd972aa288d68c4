use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub storage_path: String,
    pub booking_form_id: String,
    pub submission_endpoint: Option<String>,
    pub submission_timeout_secs: u64,
    pub notification_dismiss_secs: u64,
    pub rate_limit_max: usize,
    pub rate_limit_window_secs: u64,
    pub studio_config_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            storage_path: env::var("STORAGE_PATH").unwrap_or_else(|_| "studiobook.db".to_string()),
            booking_form_id: env::var("BOOKING_FORM_ID").unwrap_or_else(|_| "xvgkwqrd".to_string()),
            submission_endpoint: env::var("SUBMISSION_ENDPOINT").ok().filter(|v| !v.is_empty()),
            submission_timeout_secs: env::var("SUBMISSION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            notification_dismiss_secs: env::var("NOTIFICATION_DISMISS_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            studio_config_path: env::var("STUDIO_CONFIG").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_secs)
    }

    pub fn notification_dismiss_after(&self) -> Duration {
        Duration::from_secs(self.notification_dismiss_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
