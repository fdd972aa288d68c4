use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

struct Active {
    notification: Notification,
    auto_dismiss: Option<JoinHandle<()>>,
}

/// Holds the single notification currently on screen.
///
/// Success notifications schedule their own dismissal; the scheduled task is
/// aborted as soon as the notification is dismissed or replaced, so a stale
/// timer never closes a newer message.
#[derive(Clone)]
pub struct NotificationCenter {
    current: Arc<Mutex<Option<Active>>>,
    auto_dismiss_after: Duration,
}

impl NotificationCenter {
    pub fn new(auto_dismiss_after: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            auto_dismiss_after,
        }
    }

    /// Replaces whatever is showing. Must be called inside a tokio runtime
    /// when `kind` is `Success`.
    pub fn show(&self, title: &str, message: &str, kind: NotificationKind) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            created_at: chrono::Local::now().naive_local(),
        };

        let auto_dismiss = (kind == NotificationKind::Success).then(|| {
            let center = self.clone();
            let id = notification.id;
            let delay = self.auto_dismiss_after;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                center.expire(id);
            })
        });

        let previous = self.current.lock().unwrap().replace(Active {
            notification: notification.clone(),
            auto_dismiss,
        });
        if let Some(timer) = previous.and_then(|p| p.auto_dismiss) {
            timer.abort();
        }

        tracing::debug!(id = %notification.id, kind = kind.as_str(), "notification shown");
        notification
    }

    pub fn current(&self) -> Option<Notification> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|a| a.notification.clone())
    }

    /// User acknowledgement. Returns false if `id` is not the one showing.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let active = {
            let mut current = self.current.lock().unwrap();
            if current.as_ref().is_some_and(|a| a.notification.id == id) {
                current.take()
            } else {
                None
            }
        };

        match active {
            Some(active) => {
                if let Some(timer) = active.auto_dismiss {
                    timer.abort();
                }
                tracing::debug!(%id, "notification dismissed");
                true
            }
            None => false,
        }
    }

    fn expire(&self, id: Uuid) {
        let mut current = self.current.lock().unwrap();
        if current.as_ref().is_some_and(|a| a.notification.id == id) {
            *current = None;
            tracing::debug!(%id, "notification auto-dismissed");
        }
    }
}
