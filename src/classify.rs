// src/classify.rs
//
// Contract-vs-extra classification of shifts against a weekly quota.
// Classification is never persisted; it is recomputed from the current
// settings and sibling shifts on every call, so retroactive contract changes
// need no cache invalidation.

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::clock::duration_hours;
use crate::model::{Shift, UserWorkSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftKind {
    /// Counts against the weekly contracted quota.
    Contract,
    /// Spills beyond the quota (or falls outside the contract entirely).
    Extra,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("shift on {date} ({start}-{end}) not present in the user's shift history")]
    ShiftNotInHistory {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// A shift annotated with its computed hours and classification. Derived
/// data only; rebuilt on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedShift {
    pub shift: Shift,
    pub hours: Decimal,
    pub kind: ShiftKind,
}

/// Classifies one shift against the user's full shift history.
///
/// Hours are greedily assigned to the contract bucket in date order (start
/// time as tie-break, insertion order after that) until the weekly quota is
/// exhausted. A shift is never split: it is wholly contract if its duration
/// fits in the quota still remaining when it is reached, wholly extra
/// otherwise.
///
/// Returns `ClassifyError::ShiftNotInHistory` when no entry in `all_shifts`
/// matches the shift by (date, start, end); the caller decides the fallback.
pub fn classify_shift(
    shift: &Shift,
    all_shifts: &[Shift],
    weekly_quota: Decimal,
    contract_start: Option<NaiveDate>,
) -> Result<ShiftKind, ClassifyError> {
    let Some(contract_start) = contract_start else {
        return Ok(ShiftKind::Extra);
    };
    if shift.date < contract_start {
        return Ok(ShiftKind::Extra);
    }

    let week = shift.date.iso_week();
    let mut week_shifts: Vec<&Shift> = all_shifts
        .iter()
        .filter(|s| s.date >= contract_start && s.date.iso_week() == week)
        .collect();
    // Stable sort: same (date, start) pairs keep their input order, so two
    // calls over the same collection always agree.
    week_shifts.sort_by_key(|s| (s.date, s.start_time));

    let mut consumed = Decimal::ZERO;
    for s in week_shifts {
        let hours = duration_hours(s.start_time, s.end_time);
        let remaining = weekly_quota - consumed;
        if s.date == shift.date && s.start_time == shift.start_time && s.end_time == shift.end_time
        {
            return Ok(if hours <= remaining {
                ShiftKind::Contract
            } else {
                ShiftKind::Extra
            });
        }
        consumed += hours.min(remaining);
    }

    Err(ClassifyError::ShiftNotInHistory {
        date: shift.date,
        start: shift.start_time,
        end: shift.end_time,
    })
}

/// Classifies every shift in the collection against itself.
pub fn classify_all(
    shifts: &[Shift],
    settings: &UserWorkSettings,
) -> Result<Vec<ClassifiedShift>, ClassifyError> {
    shifts
        .iter()
        .map(|shift| {
            let kind = classify_shift(
                shift,
                shifts,
                settings.weekly_hours,
                settings.contract_start_date,
            )?;
            Ok(ClassifiedShift {
                shift: shift.clone(),
                hours: duration_hours(shift.start_time, shift.end_time),
                kind,
            })
        })
        .collect()
}
