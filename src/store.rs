// src/store.rs
//
// Boundary to whatever persistence backs the application. The core only
// ever sees already-materialized collections; fetch and write failures
// surface as a generic `StoreError` and retries, if any, belong to the
// implementation behind the trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::leave::{LeaveDraft, LeaveRequest, LeaveStatus};
use crate::model::{ChangeLogEntry, SharedShift, Shift, ShiftDraft, ShiftStatus, UserProfile};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage fetch failed: {0}")]
    Fetch(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError>;
    async fn shared_shifts_for_user(&self, user_id: &str) -> Result<Vec<SharedShift>, StoreError>;

    async fn insert_shift(&self, user_id: &str, draft: ShiftDraft) -> Result<Shift, StoreError>;
    async fn insert_shared_shift(
        &self,
        assigned_to: &str,
        created_by: &str,
        draft: ShiftDraft,
    ) -> Result<SharedShift, StoreError>;

    async fn update_shift_status(
        &self,
        shift_id: &str,
        status: ShiftStatus,
    ) -> Result<Shift, StoreError>;
    async fn delete_shift(&self, shift_id: &str) -> Result<(), StoreError>;
    async fn delete_shared_shift(&self, shift_id: &str) -> Result<SharedShift, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError>;
    async fn settings_map(&self) -> Result<HashMap<String, String>, StoreError>;
    async fn append_change_log(&self, entry: ChangeLogEntry) -> Result<(), StoreError>;

    async fn insert_leave_request(
        &self,
        user_id: &str,
        draft: LeaveDraft,
    ) -> Result<LeaveRequest, StoreError>;
    async fn leave_request(&self, request_id: &str) -> Result<LeaveRequest, StoreError>;
    async fn update_leave_review(
        &self,
        request_id: &str,
        status: LeaveStatus,
        reviewed_by: &str,
        review_notes: Option<String>,
    ) -> Result<LeaveRequest, StoreError>;
}

// --- In-memory reference implementation ---

#[derive(Default)]
struct MemoryInner {
    shifts: Vec<Shift>,
    shared_shifts: Vec<SharedShift>,
    users: Vec<UserProfile>,
    settings: HashMap<String, String>,
    change_log: Vec<ChangeLogEntry>,
    leave_requests: Vec<LeaveRequest>,
}

/// Mutex-guarded in-memory store. Backs the test suite and doubles as a
/// reference for what a real backend has to provide.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    next_id: AtomicU64,
    deny_shared_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserProfile>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().users = users;
        store
    }

    /// Simulates a backend that rejects shared-calendar writes, e.g. a
    /// non-admin session hitting a row-level permission.
    pub fn deny_shared_writes(&self, deny: bool) {
        self.deny_shared_writes.store(deny, Ordering::SeqCst);
    }

    pub fn set_setting(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(key.to_string(), value.to_string());
    }

    pub fn seed_shift(&self, user_id: &str, draft: ShiftDraft) -> Shift {
        let shift = Shift {
            id: self.fresh_id("shift"),
            user_id: user_id.to_string(),
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            notes: draft.notes,
            status: draft.status,
        };
        self.inner.lock().unwrap().shifts.push(shift.clone());
        shift
    }

    pub fn seed_shared_shift(&self, assigned_to: &str, draft: ShiftDraft) -> SharedShift {
        let shift = SharedShift {
            id: self.fresh_id("gshift"),
            assigned_to_user_id: assigned_to.to_string(),
            created_by_user_id: assigned_to.to_string(),
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            notes: draft.notes,
            status: draft.status,
        };
        self.inner.lock().unwrap().shared_shifts.push(shift.clone());
        shift
    }

    pub fn change_log(&self) -> Vec<ChangeLogEntry> {
        self.inner.lock().unwrap().change_log.clone()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n}")
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .shifts
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn shared_shifts_for_user(&self, user_id: &str) -> Result<Vec<SharedShift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .shared_shifts
            .iter()
            .filter(|s| s.assigned_to_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_shift(&self, user_id: &str, draft: ShiftDraft) -> Result<Shift, StoreError> {
        Ok(self.seed_shift(user_id, draft))
    }

    async fn insert_shared_shift(
        &self,
        assigned_to: &str,
        created_by: &str,
        draft: ShiftDraft,
    ) -> Result<SharedShift, StoreError> {
        if self.deny_shared_writes.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied(
                "shared calendar writes not allowed for this session".to_string(),
            ));
        }
        let shift = SharedShift {
            id: self.fresh_id("gshift"),
            assigned_to_user_id: assigned_to.to_string(),
            created_by_user_id: created_by.to_string(),
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            notes: draft.notes,
            status: draft.status,
        };
        self.inner.lock().unwrap().shared_shifts.push(shift.clone());
        Ok(shift)
    }

    async fn update_shift_status(
        &self,
        shift_id: &str,
        status: ShiftStatus,
    ) -> Result<Shift, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let shift = inner
            .shifts
            .iter_mut()
            .find(|s| s.id == shift_id)
            .ok_or_else(|| StoreError::NotFound(format!("shift {shift_id}")))?;
        shift.status = status;
        Ok(shift.clone())
    }

    async fn delete_shift(&self, shift_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.shifts.len();
        inner.shifts.retain(|s| s.id != shift_id);
        if inner.shifts.len() == before {
            return Err(StoreError::NotFound(format!("shift {shift_id}")));
        }
        Ok(())
    }

    async fn delete_shared_shift(&self, shift_id: &str) -> Result<SharedShift, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let position = inner
            .shared_shifts
            .iter()
            .position(|s| s.id == shift_id)
            .ok_or_else(|| StoreError::NotFound(format!("shared shift {shift_id}")))?;
        Ok(inner.shared_shifts.remove(position))
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.inner.lock().unwrap().users.clone())
    }

    async fn settings_map(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.inner.lock().unwrap().settings.clone())
    }

    async fn append_change_log(&self, entry: ChangeLogEntry) -> Result<(), StoreError> {
        self.inner.lock().unwrap().change_log.push(entry);
        Ok(())
    }

    async fn insert_leave_request(
        &self,
        user_id: &str,
        draft: LeaveDraft,
    ) -> Result<LeaveRequest, StoreError> {
        let request = LeaveRequest {
            id: self.fresh_id("leave"),
            user_id: user_id.to_string(),
            request_type: draft.request_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason,
            status: LeaveStatus::Pending,
            reviewed_by_user_id: None,
            review_notes: None,
        };
        self.inner
            .lock()
            .unwrap()
            .leave_requests
            .push(request.clone());
        Ok(request)
    }

    async fn leave_request(&self, request_id: &str) -> Result<LeaveRequest, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .leave_requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("leave request {request_id}")))
    }

    async fn update_leave_review(
        &self,
        request_id: &str,
        status: LeaveStatus,
        reviewed_by: &str,
        review_notes: Option<String>,
    ) -> Result<LeaveRequest, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let request = inner
            .leave_requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| StoreError::NotFound(format!("leave request {request_id}")))?;
        request.status = status;
        request.reviewed_by_user_id = Some(reviewed_by.to_string());
        request.review_notes = review_notes;
        Ok(request.clone())
    }
}
