use super::super::domain::ReceiverId;
use super::super::expiry::DayWindow;
use serde::{Deserialize, Serialize};

/// User-selected constraints for one cascade run. Every axis is optional;
/// an absent value (or empty list) leaves that axis unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPredicates {
    /// Matched case-insensitively against the listing location or the
    /// provider's registered city.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    /// Allowed food type labels, compared exactly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub food_types: Vec<String>,
    /// Allowed meal type labels, compared exactly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meal_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_window: Option<DayWindow>,
    /// Keep listings with an unknown expiry date while `days_window` or
    /// `only_upcoming` is active.
    pub include_unknown_expiry: bool,
    /// Drop listings that have already expired.
    pub only_upcoming: bool,
    /// Receiver-side narrowing, applied to claims after listing narrowing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub receiver_ids: Vec<ReceiverId>,
}

impl FilterPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    pub fn with_food_type(mut self, food_type: impl Into<String>) -> Self {
        self.food_types.push(food_type.into());
        self
    }

    pub fn with_meal_type(mut self, meal_type: impl Into<String>) -> Self {
        self.meal_types.push(meal_type.into());
        self
    }

    pub fn with_days_window(mut self, window: DayWindow) -> Self {
        self.days_window = Some(window);
        self
    }

    pub fn including_unknown_expiry(mut self) -> Self {
        self.include_unknown_expiry = true;
        self
    }

    pub fn upcoming_only(mut self) -> Self {
        self.only_upcoming = true;
        self
    }

    pub fn with_receiver(mut self, receiver: ReceiverId) -> Self {
        self.receiver_ids.push(receiver);
        self
    }

    /// True when no axis is constrained and the cascade is an identity.
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.provider_name.is_none()
            && self.food_types.is_empty()
            && self.meal_types.is_empty()
            && self.days_window.is_none()
            && !self.only_upcoming
            && self.receiver_ids.is_empty()
    }

    /// Whether any constraint needs the expiry normalizer.
    pub(crate) fn touches_expiry(&self) -> bool {
        self.days_window.is_some() || self.only_upcoming
    }
}
