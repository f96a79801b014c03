// src/clock.rs
//
// Wall-clock arithmetic and display formatting shared by the classifier and
// the reporting engine.

use chrono::{NaiveTime, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Elapsed hours between two wall-clock times.
///
/// An end time numerically earlier than the start is treated as a shift that
/// crosses midnight, so the result is always fractional hours in `[0, 24)`.
/// Seconds are ignored; shifts are recorded to minute precision.
pub fn duration_hours(start: NaiveTime, end: NaiveTime) -> Decimal {
    let mut hours = end.hour() as i64 - start.hour() as i64;
    let mut minutes = end.minute() as i64 - start.minute() as i64;

    // Borrow before wrapping, so a backwards same-hour pair like
    // 09:30 -> 09:15 lands at 23.75 rather than going negative.
    if minutes < 0 {
        hours -= 1;
        minutes += 60;
    }
    if hours < 0 {
        hours += 24;
    }

    Decimal::from(hours) + Decimal::from(minutes) / dec!(60)
}

/// Renders fractional hours as `"7h 30m"`, dropping the minute part when it
/// rounds to zero.
pub fn format_duration(hours: Decimal) -> String {
    let whole = hours.floor();
    let mut minutes = ((hours - whole) * dec!(60))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0);
    let mut whole = whole.to_i64().unwrap_or(0);
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    if minutes > 0 {
        format!("{whole}h {minutes}m")
    } else {
        format!("{whole}h")
    }
}

/// Renders an amount in it-IT currency conventions: dot-grouped thousands,
/// comma decimal separator, trailing euro sign. Two decimals, rounded half
/// away from zero.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let total_cents = (rounded.abs() * dec!(100)).to_i128().unwrap_or(0);
    let units = (total_cents / 100).to_string();
    let cents = total_cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{cents:02} €")
}
