// src/shift_service.rs
//
// User and admin shift operations over the storage boundary. Storage
// failures bubble up with context; notification delivery is best effort and
// never fails the calling operation.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::csv_import::ParsedShiftRow;
use crate::model::{ChangeLogEntry, SharedShift, Shift, ShiftDraft, ShiftStatus};
use crate::notify::{send_best_effort, Notification, Notifier};
use crate::store::ShiftStore;

pub struct ShiftService {
    store: Arc<dyn ShiftStore>,
    notifier: Arc<dyn Notifier>,
}

impl ShiftService {
    pub fn new(store: Arc<dyn ShiftStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Adds a personal shift and mirrors its structural twin onto the shared
    /// calendar. The mirror write is tolerated failing: sessions without
    /// shared-calendar permission still get their personal shift, and the
    /// next sync picks the copy up.
    pub async fn add_shift(&self, user_id: &str, draft: ShiftDraft) -> Result<Shift> {
        let shift = self
            .store
            .insert_shift(user_id, draft.clone())
            .await
            .context("inserting personal shift")?;
        if let Err(err) = self.store.insert_shared_shift(user_id, user_id, draft).await {
            warn!("failed to mirror shift onto shared calendar: {}", err);
        }
        Ok(shift)
    }

    /// Admin-side assignment: writes the shared entry, records the change
    /// and notifies the assignee (best effort).
    pub async fn assign_shift(
        &self,
        admin_id: &str,
        assigned_to: &str,
        draft: ShiftDraft,
    ) -> Result<SharedShift> {
        let shift = self
            .store
            .insert_shared_shift(assigned_to, admin_id, draft)
            .await
            .context("inserting shared shift")?;
        self.store
            .append_change_log(ChangeLogEntry {
                user_id: admin_id.to_string(),
                action: "add".to_string(),
                details: format!("shift added for {} on {}", assigned_to, shift.date),
            })
            .await
            .context("recording shift assignment")?;

        send_best_effort(
            self.notifier.as_ref(),
            assigned_to,
            &Notification::ShiftAssigned {
                shift_date: shift.date,
                start_time: shift.start_time,
                end_time: shift.end_time,
                notes: shift.notes.clone(),
            },
        )
        .await;
        Ok(shift)
    }

    pub async fn set_status(&self, shift_id: &str, status: ShiftStatus) -> Result<Shift> {
        self.store
            .update_shift_status(shift_id, status)
            .await
            .context("updating shift status")
    }

    pub async fn delete_shift(&self, shift_id: &str) -> Result<()> {
        self.store
            .delete_shift(shift_id)
            .await
            .context("deleting personal shift")
    }

    pub async fn delete_shared_shift(&self, admin_id: &str, shift_id: &str) -> Result<()> {
        let removed = self
            .store
            .delete_shared_shift(shift_id)
            .await
            .context("deleting shared shift")?;
        self.store
            .append_change_log(ChangeLogEntry {
                user_id: admin_id.to_string(),
                action: "delete".to_string(),
                details: format!(
                    "shift removed for {} on {}",
                    removed.assigned_to_user_id, removed.date
                ),
            })
            .await
            .context("recording shift deletion")?;
        Ok(())
    }

    /// Commits the confirmed subset of a parsed CSV import. Rows without a
    /// resolved user are skipped; nothing at all is written before this
    /// call. Returns the number of shifts imported.
    pub async fn import_parsed_rows(
        &self,
        admin_id: &str,
        rows: &[ParsedShiftRow],
    ) -> Result<usize> {
        let mut imported = 0;
        for row in rows {
            let Some(assigned_to) = row.matched_user_id.as_deref() else {
                continue;
            };
            let draft = ShiftDraft {
                date: row.date,
                start_time: row.start_time,
                end_time: row.end_time,
                notes: row.notes.clone(),
                status: row.status,
            };
            self.store
                .insert_shared_shift(assigned_to, admin_id, draft)
                .await
                .with_context(|| format!("importing shift for {assigned_to} on {}", row.date))?;
            imported += 1;
        }

        if imported > 0 {
            self.store
                .append_change_log(ChangeLogEntry {
                    user_id: admin_id.to_string(),
                    action: "import".to_string(),
                    details: format!("{imported} shifts imported from CSV"),
                })
                .await
                .context("recording CSV import")?;
        }
        info!("CSV import committed {} shifts", imported);
        Ok(imported)
    }
}
