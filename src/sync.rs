// src/sync.rs
//
// Reconciliation between a user's private shift list and the
// organization-wide calendar. The diff itself is pure; applying it runs at
// most once per session and treats the two write directions independently.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use crate::model::{SharedShift, Shift};
use crate::store::{ShiftStore, StoreError};

/// The tuple (date, start, end) rendered as a comparable key. Matching
/// entries across the two collections compares only this key; diverging
/// notes or status on both sides are deliberately left alone.
fn structural_key(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> String {
    format!("{}|{}|{}", date, start.format("%H:%M"), end.format("%H:%M"))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncPlan {
    pub to_add_to_private: Vec<SharedShift>,
    pub to_add_to_shared: Vec<Shift>,
}

/// Pure presence diff by structural key, in input order on both sides.
pub fn reconcile(private: &[Shift], shared: &[SharedShift]) -> SyncPlan {
    let private_keys: HashSet<String> = private
        .iter()
        .map(|s| structural_key(s.date, s.start_time, s.end_time))
        .collect();
    let shared_keys: HashSet<String> = shared
        .iter()
        .map(|s| structural_key(s.date, s.start_time, s.end_time))
        .collect();

    SyncPlan {
        to_add_to_private: shared
            .iter()
            .filter(|s| !private_keys.contains(&structural_key(s.date, s.start_time, s.end_time)))
            .cloned()
            .collect(),
        to_add_to_shared: private
            .iter()
            .filter(|s| !shared_keys.contains(&structural_key(s.date, s.start_time, s.end_time)))
            .cloned()
            .collect(),
    }
}

/// Per-session state. Built exactly once at session establishment; the sync
/// flag is claimed with compare-and-swap so racing callers still get
/// at-most-once.
#[derive(Debug)]
pub struct SessionContext {
    pub user_id: String,
    synced: AtomicBool,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            synced: AtomicBool::new(false),
        }
    }

    /// True for exactly one caller per session.
    fn claim_sync(&self) -> bool {
        self.synced
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncOutcome {
    pub added_to_private: usize,
    pub added_to_shared: usize,
    /// Set when this session had already run the sync.
    pub skipped: bool,
    pub private_write_failed: bool,
    pub shared_write_failed: bool,
}

pub struct SyncService {
    store: Arc<dyn ShiftStore>,
}

impl SyncService {
    pub fn new(store: Arc<dyn ShiftStore>) -> Self {
        Self { store }
    }

    /// Runs the calendar reconciliation for the session's user, at most once
    /// per session. Each direction is written independently: a rejected
    /// write on one side (e.g. missing permission on the shared calendar)
    /// is logged, flagged on the outcome, and never blocks the other side.
    pub async fn run(&self, ctx: &SessionContext) -> Result<SyncOutcome, StoreError> {
        if !ctx.claim_sync() {
            debug!("shift sync already ran for this session, skipping");
            return Ok(SyncOutcome {
                skipped: true,
                ..SyncOutcome::default()
            });
        }

        info!("starting shift sync for user {}", ctx.user_id);
        let shared = self.store.shared_shifts_for_user(&ctx.user_id).await?;
        let private = self.store.shifts_for_user(&ctx.user_id).await?;
        let plan = reconcile(&private, &shared);

        let mut outcome = SyncOutcome::default();
        for shift in &plan.to_add_to_private {
            match self.store.insert_shift(&ctx.user_id, shift.draft()).await {
                Ok(_) => outcome.added_to_private += 1,
                Err(err) => {
                    warn!("failed to copy shared shift into private list: {}", err);
                    outcome.private_write_failed = true;
                }
            }
        }
        for shift in &plan.to_add_to_shared {
            match self
                .store
                .insert_shared_shift(&ctx.user_id, &ctx.user_id, shift.draft())
                .await
            {
                Ok(_) => outcome.added_to_shared += 1,
                Err(err) => {
                    warn!("failed to copy private shift onto shared calendar: {}", err);
                    outcome.shared_write_failed = true;
                }
            }
        }

        info!(
            "shift sync for user {} done: {} into private, {} into shared",
            ctx.user_id, outcome.added_to_private, outcome.added_to_shared
        );
        Ok(outcome)
    }
}
