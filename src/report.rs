// src/report.rs
//
// Rolls classified, priced shifts up into the summary statistics the
// dashboards and exports render. This module is the only interface surface
// report consumers see; they must not recompute classification or earnings
// themselves.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::classify::{classify_shift, ClassifyError, ShiftKind};
use crate::clock::duration_hours;
use crate::earnings::{shift_earnings, RateCard};
use crate::model::{Shift, ShiftStatus, SystemPaySettings, UserWorkSettings};

/// Date interval a report covers. `Range` is closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    Month { year: i32, month: u32 },
    Week { year: i32, week: u32 },
    Range { start: NaiveDate, end: NaiveDate },
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Window::All => true,
            Window::Month { year, month } => date.year() == year && date.month() == month,
            Window::Week { year, week } => {
                let iso = date.iso_week();
                iso.year() == year && iso.week() == week
            }
            Window::Range { start, end } => date >= start && date <= end,
        }
    }
}

/// Totals for one window. Earnings are bucketed by (classification, paid
/// status); the three derived totals are filled in by [`aggregate`] so they
/// always agree with the buckets.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_shifts: usize,
    pub total_hours: Decimal,
    pub contract_hours: Decimal,
    pub extra_hours: Decimal,
    pub paid_contract: Decimal,
    pub unpaid_contract: Decimal,
    pub paid_extra: Decimal,
    pub unpaid_extra: Decimal,
    pub contract_earnings: Decimal,
    pub extra_earnings: Decimal,
    pub total_earnings: Decimal,
}

/// Summarizes the shifts falling inside `window`.
///
/// `all_shifts` must be the user's complete history: window filtering only
/// selects which shifts are counted, while classification always runs
/// against every sibling, so quota consumed by shifts outside the window
/// still applies. Pure: identical inputs give identical output and the
/// input collection is never mutated.
pub fn aggregate(
    all_shifts: &[Shift],
    user: &UserWorkSettings,
    system: &SystemPaySettings,
    window: &Window,
) -> Result<Summary, ClassifyError> {
    let rates = RateCard::resolve(user, system);
    let mut summary = Summary::default();

    for shift in all_shifts.iter().filter(|s| window.contains(s.date)) {
        let hours = duration_hours(shift.start_time, shift.end_time);
        let kind = classify_shift(
            shift,
            all_shifts,
            user.weekly_hours,
            user.contract_start_date,
        )?;
        let earned = shift_earnings(kind, hours, system.payment_method, &rates);

        summary.total_shifts += 1;
        summary.total_hours += hours;
        match (kind, shift.status) {
            (ShiftKind::Contract, ShiftStatus::Paid) => {
                summary.contract_hours += hours;
                summary.paid_contract += earned;
            }
            (ShiftKind::Contract, ShiftStatus::Pending) => {
                summary.contract_hours += hours;
                summary.unpaid_contract += earned;
            }
            (ShiftKind::Extra, ShiftStatus::Paid) => {
                summary.extra_hours += hours;
                summary.paid_extra += earned;
            }
            (ShiftKind::Extra, ShiftStatus::Pending) => {
                summary.extra_hours += hours;
                summary.unpaid_extra += earned;
            }
        }
    }

    summary.contract_earnings = summary.paid_contract + summary.unpaid_contract;
    summary.extra_earnings = summary.paid_extra + summary.unpaid_extra;
    summary.total_earnings = summary.contract_earnings + summary.extra_earnings;
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub summary: Summary,
}

/// Last-month-versus-previous percentage deltas, rounded to the nearest
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendComparison {
    pub hours_change_pct: i64,
    pub earnings_change_pct: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// Oldest month first, the reference month last.
    pub months: Vec<MonthSummary>,
    pub comparison: Option<TrendComparison>,
}

/// One full [`Summary`] per calendar month for the trailing `months` months
/// ending at `reference`'s month, plus the period-over-period comparison of
/// the final month against its predecessor.
pub fn monthly_trend(
    all_shifts: &[Shift],
    user: &UserWorkSettings,
    system: &SystemPaySettings,
    reference: NaiveDate,
    months: usize,
) -> Result<MonthlyTrend, ClassifyError> {
    let mut out = Vec::with_capacity(months);
    for back in (0..months).rev() {
        let (year, month) = months_before(reference.year(), reference.month(), back as i32);
        let summary = aggregate(all_shifts, user, system, &Window::Month { year, month })?;
        out.push(MonthSummary {
            year,
            month,
            summary,
        });
    }

    let comparison = match out.as_slice() {
        [.., previous, current] => Some(TrendComparison {
            hours_change_pct: percent_change(
                previous.summary.total_hours,
                current.summary.total_hours,
            ),
            earnings_change_pct: percent_change(
                previous.summary.total_earnings,
                current.summary.total_earnings,
            ),
        }),
        _ => None,
    };

    Ok(MonthlyTrend {
        months: out,
        comparison,
    })
}

/// `(current - previous) / previous * 100`, rounded to the nearest integer,
/// 0 when the previous period had nothing to compare against.
pub fn percent_change(previous: Decimal, current: Decimal) -> i64 {
    if previous <= Decimal::ZERO {
        return 0;
    }
    ((current - previous) / previous * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Calendar month `back` months before (year, month), wrapping across years.
pub(crate) fn months_before(year: i32, month: u32, back: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}
