// src/csv_import.rs
//
// Tolerant importer for loosely-formatted shift CSVs. Every row failure is
// collected into a user-visible error list instead of aborting the import;
// nothing is committed here — the caller shows the report and writes the
// confirmed subset through the service layer.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::model::{ShiftStatus, UserProfile};

static DATE_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static DATE_DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})[:.](\d{2})$").unwrap());

/// One candidate shift parsed from a CSV row. A row with no resolvable user
/// is still returned (with `matched_user_id = None` and a row-level error)
/// so the caller can show it before deciding; only matched rows are eligible
/// for the commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedShiftRow {
    pub matched_user_id: Option<String>,
    pub employee_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub shifts: Vec<ParsedShiftRow>,
    pub errors: Vec<String>,
    pub total_rows: usize,
}

/// Parses raw CSV text into candidate shift rows, resolving each free-text
/// employee name against `users`.
///
/// Accepts comma or semicolon separators and double-quoted fields. The first
/// non-blank line is treated as a header when it mentions any of "nome",
/// "dipendente" or "data" (case-insensitive). Expected columns:
/// name, date, start, end, [notes], [status].
pub fn parse_shifts_csv(content: &str, users: &[UserProfile]) -> ImportReport {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut errors = Vec::new();
    let mut shifts = Vec::new();

    if lines.is_empty() {
        return ImportReport {
            shifts,
            errors: vec!["the CSV file is empty".to_string()],
            total_rows: 0,
        };
    }

    let header = lines[0].to_lowercase();
    let has_header =
        header.contains("nome") || header.contains("dipendente") || header.contains("data");
    let start_index = usize::from(has_header);
    let total_rows = lines.len() - start_index;

    // Sort by id so substring ties resolve the same way whatever order the
    // storage backend returned the users in.
    let mut users: Vec<&UserProfile> = users.iter().collect();
    users.sort_by(|a, b| a.id.cmp(&b.id));

    for (index, line) in lines.iter().enumerate().skip(start_index) {
        let row_number = index + 1;
        let columns = split_csv_line(line);

        if columns.len() < 4 {
            errors.push(format!(
                "row {row_number}: invalid format (at least 4 columns required)"
            ));
            continue;
        }

        let employee_name = columns[0].trim();
        let Some(date) = parse_date(columns[1].trim()) else {
            errors.push(format!(
                "row {row_number}: invalid date \"{}\"",
                columns[1].trim()
            ));
            continue;
        };
        let (Some(start_time), Some(end_time)) = (
            normalize_time(columns[2].trim()),
            normalize_time(columns[3].trim()),
        ) else {
            errors.push(format!("row {row_number}: invalid time format"));
            continue;
        };

        let notes = columns
            .get(4)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from);
        let status = columns
            .get(5)
            .map(|s| parse_status(s.trim()))
            .unwrap_or(ShiftStatus::Pending);

        let matched_user_id = find_user_by_name(employee_name, &users);
        let error = matched_user_id
            .is_none()
            .then(|| "user not found".to_string());

        shifts.push(ParsedShiftRow {
            matched_user_id,
            employee_name: employee_name.to_string(),
            date,
            start_time,
            end_time,
            notes,
            status,
            error,
        });
    }

    ImportReport {
        shifts,
        errors,
        total_rows,
    }
}

/// Splits one line on unquoted commas or semicolons. Double quotes toggle
/// quoting and are stripped from the output.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' | ';' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Accepts `YYYY-MM-DD` or `D/M/YYYY` / `D-M-YYYY` with 1–2 digit day and
/// month. Calendar-invalid dates are rejected.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if DATE_ISO.is_match(raw) {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    }
    let captures = DATE_DMY.captures(raw)?;
    let day: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let year: i32 = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Accepts `H:MM`, `HH:MM`, `H.MM` and `HH.MM`, normalized to a real
/// 24-hour clock value.
fn normalize_time(raw: &str) -> Option<NaiveTime> {
    let captures = TIME.captures(raw)?;
    let hours: u32 = captures[1].parse().ok()?;
    let minutes: u32 = captures[2].parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// "paid", "pagato" and "1" (case-insensitive) mean paid; anything else is
/// pending.
fn parse_status(raw: &str) -> ShiftStatus {
    match raw.to_lowercase().as_str() {
        "paid" | "pagato" | "1" => ShiftStatus::Paid,
        _ => ShiftStatus::Pending,
    }
}

/// Tiered name resolution, first match wins:
/// exact username, exact full name, substring on full name (either
/// direction), substring on username (either direction). All tiers are
/// case-insensitive.
fn find_user_by_name(name: &str, users: &[&UserProfile]) -> Option<String> {
    let needle = name.trim().to_lowercase();

    if let Some(user) = users.iter().find(|u| u.username.to_lowercase() == needle) {
        return Some(user.id.clone());
    }

    if let Some(user) = users.iter().find(|u| {
        u.full_name
            .as_ref()
            .is_some_and(|full| full.to_lowercase() == needle)
    }) {
        return Some(user.id.clone());
    }

    if let Some(user) = users.iter().find(|u| {
        u.full_name.as_ref().is_some_and(|full| {
            let full = full.to_lowercase();
            full.contains(&needle) || needle.contains(&full)
        })
    }) {
        return Some(user.id.clone());
    }

    if let Some(user) = users.iter().find(|u| {
        let username = u.username.to_lowercase();
        username.contains(&needle) || needle.contains(&username)
    }) {
        return Some(user.id.clone());
    }

    None
}
