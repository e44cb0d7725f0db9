//! Transient, dismissible notifications.
//!
//! Each notification carries its own auto-dismiss deadline. Dismissing one
//! by hand removes it together with its pending deadline.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

/// Default on-screen lifetime of a notification.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

impl Level {
    pub fn icon(self) -> &'static str {
        match self {
            Level::Success => "check-circle",
            Level::Error => "exclamation-circle",
            Level::Warning => "exclamation-triangle",
            Level::Info => "info-circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub level: Level,
    pub message: String,
    pub dismiss_at: Instant,
}

#[derive(Debug)]
pub struct Notifications {
    lifetime: Duration,
    next_id: u64,
    active: Vec<Notification>,
}

impl Notifications {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            next_id: 0,
            active: Vec::new(),
        }
    }

    pub fn show(&mut self, level: Level, message: impl Into<String>) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        let message = message.into();
        debug!(?level, %message, "notification shown");
        self.active.push(Notification {
            id,
            level,
            message,
            dismiss_at: Instant::now() + self.lifetime,
        });
        id
    }

    /// Manual close. Returns whether the notification was still showing.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        before != self.active.len()
    }

    /// Drop every notification whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<Notification> {
        let (expired, active): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|n| n.dismiss_at <= now);
        self.active = active;
        expired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.iter().map(|n| n.dismiss_at).min()
    }

    /// Wait for the next deadline and drop what it covers. Returns immediately
    /// when nothing is showing.
    pub async fn settle_next(&mut self) -> Vec<Notification> {
        match self.next_deadline() {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.expire(Instant::now())
            }
            None => Vec::new(),
        }
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.active.iter().map(|n| n.message.as_str())
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(NOTIFICATION_LIFETIME)
    }
}
