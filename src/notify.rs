// src/notify.rs

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Structured payload handed to the notification collaborator. The transport
/// (email, push, ...) lives behind the trait and is out of scope here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ShiftAssigned {
        shift_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        notes: Option<String>,
    },
    LeaveReviewed {
        request_id: String,
        approved: bool,
        review_notes: Option<String>,
    },
}

#[derive(Error, Debug)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError>;
}

/// Delivery is best effort: a failed send is logged and swallowed, never
/// propagated to the calling operation.
pub async fn send_best_effort(notifier: &dyn Notifier, user_id: &str, notification: &Notification) {
    if let Err(err) = notifier.send(user_id, notification).await {
        warn!("failed to deliver notification to {}: {}", user_id, err);
    }
}

/// Stand-in transport that just logs the serialized payload.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError> {
        let payload =
            serde_json::to_string(notification).map_err(|err| NotifyError(err.to_string()))?;
        info!("notification to {}: {}", user_id, payload);
        Ok(())
    }
}
