// src/leave.rs
//
// Leave requests: employees submit a typed date range, an administrator
// approves or rejects it. The decision is recorded in the change log and
// notified to the requester best effort.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ChangeLogEntry;
use crate::notify::{send_best_effort, Notification, Notifier};
use crate::store::ShiftStore;

/// Wire values match the original data model, hence the Italian names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    #[serde(rename = "ferie")]
    Vacation,
    #[serde(rename = "permesso")]
    Personal,
    #[serde(rename = "malattia")]
    Sick,
    #[serde(rename = "altro")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub user_id: String,
    pub request_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub reviewed_by_user_id: Option<String>,
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDraft {
    pub request_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

pub struct LeaveService {
    store: Arc<dyn ShiftStore>,
    notifier: Arc<dyn Notifier>,
}

impl LeaveService {
    pub fn new(store: Arc<dyn ShiftStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn submit(&self, user_id: &str, draft: LeaveDraft) -> Result<LeaveRequest> {
        if draft.end_date < draft.start_date {
            bail!(
                "leave request end date {} precedes start date {}",
                draft.end_date,
                draft.start_date
            );
        }
        self.store
            .insert_leave_request(user_id, draft)
            .await
            .context("inserting leave request")
    }

    /// Approves or rejects a pending request, recording the reviewer and
    /// notifying the requester (best effort).
    pub async fn review(
        &self,
        reviewer_id: &str,
        request_id: &str,
        approve: bool,
        review_notes: Option<String>,
    ) -> Result<LeaveRequest> {
        let status = if approve {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Rejected
        };
        let request = self
            .store
            .update_leave_review(request_id, status, reviewer_id, review_notes)
            .await
            .context("updating leave request review")?;

        self.store
            .append_change_log(ChangeLogEntry {
                user_id: reviewer_id.to_string(),
                action: "review".to_string(),
                details: format!(
                    "leave request {} for {} {}",
                    request.id,
                    request.user_id,
                    if approve { "approved" } else { "rejected" }
                ),
            })
            .await
            .context("recording leave review")?;

        send_best_effort(
            self.notifier.as_ref(),
            &request.user_id,
            &Notification::LeaveReviewed {
                request_id: request.id.clone(),
                approved: approve,
                review_notes: request.review_notes.clone(),
            },
        )
        .await;
        Ok(request)
    }
}
