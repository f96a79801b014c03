//! Core logic for a small shift-scheduling and timesheet application.
//!
//! Employees log work shifts, administrators assign them on a shared
//! calendar, and the crate derives worked hours, contract-vs-extra
//! classification against a weekly quota, and estimated earnings. Storage
//! and notification delivery are collaborator boundaries (see [`store`] and
//! [`notify`]); everything else here is pure computation over collections
//! that have already been fetched.

pub mod classify;
pub mod clock;
pub mod csv_import;
pub mod earnings;
pub mod leave;
pub mod model;
pub mod notify;
pub mod report;
pub mod shift_service;
pub mod store;
pub mod sync;

mod service_tests;

pub use classify::{classify_all, classify_shift, ClassifiedShift, ClassifyError, ShiftKind};
pub use clock::{duration_hours, format_currency, format_duration};
pub use csv_import::{parse_shifts_csv, ImportReport, ParsedShiftRow};
pub use earnings::{compute_earnings, round_currency, shift_earnings, RateCard};
pub use leave::{LeaveDraft, LeaveRequest, LeaveService, LeaveStatus, LeaveType};
pub use model::{
    ChangeLogEntry, PaymentMethod, SharedShift, Shift, ShiftDraft, ShiftStatus, SystemPaySettings,
    UserProfile, UserWorkSettings,
};
pub use notify::{LogNotifier, Notification, Notifier, NotifyError};
pub use report::{
    aggregate, monthly_trend, MonthSummary, MonthlyTrend, Summary, TrendComparison, Window,
};
pub use shift_service::ShiftService;
pub use store::{MemoryStore, ShiftStore, StoreError};
pub use sync::{reconcile, SessionContext, SyncOutcome, SyncPlan, SyncService};
