//! Derived "days to expiry" view over food listings.
//!
//! The day count is always an unsigned magnitude; whether a listing has
//! already expired is carried separately in [`ExpiryStatus::is_expired`] and
//! is decided from the signed difference before the sign is dropped.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryStatus {
    pub days_to_expiry: Option<u32>,
    pub is_expired: bool,
    pub is_unknown: bool,
    #[serde(skip)]
    signed_days: Option<i64>,
}

impl ExpiryStatus {
    pub const UNKNOWN: Self = Self {
        days_to_expiry: None,
        is_expired: false,
        is_unknown: true,
        signed_days: None,
    };

    /// Days from `today` until expiry, negative once expired.
    pub fn signed_days(&self) -> Option<i64> {
        self.signed_days
    }

    /// Unknown expiry fails every range check.
    pub fn within(&self, window: DayWindow) -> bool {
        self.days_to_expiry
            .map(|days| window.contains(days))
            .unwrap_or(false)
    }
}

/// Classify a listing's expiry date against `today`.
pub fn normalize(expiry_date: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    let Some(expiry_date) = expiry_date else {
        return ExpiryStatus::UNKNOWN;
    };

    let delta = (expiry_date - today).num_days();
    ExpiryStatus {
        days_to_expiry: Some(u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX)),
        is_expired: delta < 0,
        is_unknown: false,
        signed_days: Some(delta),
    }
}

/// Same as [`normalize`], flooring both instants to their calendar day first.
pub fn normalize_at(expiry: Option<NaiveDateTime>, now: NaiveDateTime) -> ExpiryStatus {
    normalize(expiry.map(|value| value.date()), now.date())
}

/// Closed interval over the unsigned days-to-expiry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDayWindow")]
pub struct DayWindow {
    pub min: u32,
    pub max: u32,
}

impl DayWindow {
    /// Bounds given in either order describe the same window.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(self, days: u32) -> bool {
        (self.min..=self.max).contains(&days)
    }
}

#[derive(Deserialize)]
struct RawDayWindow {
    min: u32,
    max: u32,
}

impl From<RawDayWindow> for DayWindow {
    fn from(raw: RawDayWindow) -> Self {
        DayWindow::new(raw.min, raw.max)
    }
}
