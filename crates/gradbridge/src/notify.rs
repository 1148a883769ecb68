//! Outbound notification records and the delivery seam.
//!
//! Notifications are an output-only artifact here. The student UI owns the
//! read flag after creation; the workflows only ever append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::StudentId;

/// Category of an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A course application moved to admitted.
    Admission,
    /// A new job posting the student qualifies for.
    JobOpportunity,
    /// A new job posting, generic announcement wave.
    JobVacancy,
    /// A job application moved to accepted.
    Acceptance,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::Admission => "admission",
            NotificationKind::JobOpportunity => "job_opportunity",
            NotificationKind::JobVacancy => "job_vacancy",
            NotificationKind::Acceptance => "acceptance",
        }
    }
}

/// A single notification addressed to a student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: StudentId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Builds an unread notification stamped with the given creation time.
    pub fn new(
        user_id: StudentId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at,
        }
    }
}

/// Delivery seam for outbound notifications. Callers treat delivery as
/// best-effort; a failed delivery is logged and never fails the triggering
/// operation.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
}
