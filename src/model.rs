// src/model.rs

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// --- Shifts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    #[default]
    Pending,
    Paid,
}

/// A work shift in a user's personal list.
///
/// Times are wall-clock with no date component; an `end_time` numerically
/// earlier than `start_time` means the shift crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

/// A shift on the organization-wide calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedShift {
    pub id: String,
    pub assigned_to_user_id: String,
    pub created_by_user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

/// Insert payload for either shift collection. Ids are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

impl Shift {
    pub fn draft(&self) -> ShiftDraft {
        ShiftDraft {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes.clone(),
            status: self.status,
        }
    }
}

impl SharedShift {
    pub fn draft(&self) -> ShiftDraft {
        ShiftDraft {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes.clone(),
            status: self.status,
        }
    }
}

// --- Users ---

/// The slice of a user record the core needs for CSV name resolution and
/// notification addressing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
}

/// Per-user contract and rate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWorkSettings {
    pub user_id: String,
    /// Contracted hours per ISO week consumed before hours spill to extra.
    pub weekly_hours: Decimal,
    /// Shifts dated before this are always extra; `None` means no active
    /// contract and everything is extra.
    pub contract_start_date: Option<NaiveDate>,
    /// Rate applied to extra hours, whatever the payment method.
    pub extra_rate: Decimal,
    pub use_custom_rates: bool,
    pub custom_hourly_rate: Option<Decimal>,
    pub custom_shift_rate: Option<Decimal>,
}

impl UserWorkSettings {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            weekly_hours: dec!(18),
            contract_start_date: None,
            extra_rate: dec!(10),
            use_custom_rates: false,
            custom_hourly_rate: None,
            custom_shift_rate: None,
        }
    }
}

// --- Organization-wide pay settings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Hourly,
    PerShift,
}

/// Process-wide pay configuration. Loaded once per session from the storage
/// collaborator's key/value settings rows and refreshed explicitly after
/// updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPaySettings {
    pub payment_method: PaymentMethod,
    pub default_hourly_rate: Decimal,
    pub default_shift_rate: Decimal,
    pub users_can_edit_rates: bool,
}

impl Default for SystemPaySettings {
    fn default() -> Self {
        Self {
            payment_method: PaymentMethod::Hourly,
            default_hourly_rate: dec!(10),
            default_shift_rate: dec!(50),
            users_can_edit_rates: true,
        }
    }
}

impl SystemPaySettings {
    /// Builds typed settings from the raw key/value rows storage keeps.
    /// Missing or unparseable values fall back to the defaults rather than
    /// failing the load.
    pub fn from_settings_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let rate = |key: &str, fallback: Decimal| {
            map.get(key)
                .and_then(|v| Decimal::from_str(v).ok())
                .unwrap_or(fallback)
        };
        Self {
            payment_method: match map.get("payment_method").map(String::as_str) {
                Some("per_shift") => PaymentMethod::PerShift,
                _ => PaymentMethod::Hourly,
            },
            default_hourly_rate: rate("default_hourly_rate", defaults.default_hourly_rate),
            default_shift_rate: rate("default_shift_rate", defaults.default_shift_rate),
            users_can_edit_rates: map
                .get("users_can_edit_rates")
                .map(|v| v == "1")
                .unwrap_or(defaults.users_can_edit_rates),
        }
    }
}

// --- Change log ---

/// Audit row appended through the storage collaborator on admin mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub user_id: String,
    pub action: String,
    pub details: String,
}
