use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Numeric primary key shared by the four exchange tables. Zero means unassigned.
pub trait RecordId: Copy + Eq + std::hash::Hash + fmt::Display + Send + Sync + 'static {
    fn new(value: u32) -> Self;
    fn get(self) -> u32;
}

macro_rules! record_id {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl RecordId for $name {
            fn new(value: u32) -> Self {
                Self(value)
            }

            fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

record_id!(ProviderId, "provider");
record_id!(ReceiverId, "receiver");
record_id!(FoodId, "food");
record_id!(ClaimId, "claim");

/// Organisation donating surplus food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub id: ProviderId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub contact: String,
}

/// Organisation or individual collecting food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(default)]
    pub id: ReceiverId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub city: String,
    pub contact: String,
}

/// A quantity of food offered by a provider.
///
/// `location` is recorded independently of the provider's registered city and
/// the two are allowed to disagree. `provider_id` may not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListing {
    #[serde(default)]
    pub id: FoodId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub provider_id: ProviderId,
    #[serde(default)]
    pub provider_type: String,
    pub location: String,
    pub food_type: String,
    pub meal_type: String,
}

/// A receiver's request against a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub id: ClaimId,
    pub food_id: FoodId,
    pub receiver_id: ReceiverId,
    pub status: ClaimStatus,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Claim lifecycle label. Exports carry free text, so unrecognised labels are
/// preserved verbatim instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClaimStatus {
    Pending,
    Completed,
    Cancelled,
    Other(String),
}

impl ClaimStatus {
    pub fn from_label(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(label) => label,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<String> for ClaimStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<ClaimStatus> for String {
    fn from(value: ClaimStatus) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Materialised snapshot of the four exchange tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub providers: Vec<Provider>,
    pub receivers: Vec<Receiver>,
    pub listings: Vec<FoodListing>,
    pub claims: Vec<Claim>,
}

impl Dataset {
    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|provider| provider.id == id)
    }

    pub fn receiver(&self, id: ReceiverId) -> Option<&Receiver> {
        self.receivers.iter().find(|receiver| receiver.id == id)
    }

    pub fn listing(&self, id: FoodId) -> Option<&FoodListing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
            && self.receivers.is_empty()
            && self.listings.is_empty()
            && self.claims.is_empty()
    }
}

/// First-wins index so a duplicated id in a dirty export never panics.
pub(crate) fn index_by<'a, T, K, F>(rows: &'a [T], key: F) -> HashMap<K, &'a T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        index.entry(key(row)).or_insert(row);
    }
    index
}

/// How a free-text contact field can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Email,
    Phone,
    Missing,
}

impl ContactChannel {
    pub fn classify(contact: &str) -> Self {
        let value = contact.trim();
        if value.is_empty() {
            Self::Missing
        } else if value.contains('@') && value.chars().any(char::is_alphabetic) {
            Self::Email
        } else {
            Self::Phone
        }
    }

    /// `mailto:`/`tel:` link for the contact, if one can be formed.
    pub fn href(contact: &str) -> Option<String> {
        let value = contact.trim();
        match Self::classify(value) {
            Self::Email => Some(format!("mailto:{value}")),
            Self::Phone => Some(format!("tel:{value}")),
            Self::Missing => None,
        }
    }
}
