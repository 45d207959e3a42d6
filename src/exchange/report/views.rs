use super::super::cascade::AnnotatedListing;
use super::super::domain::ContactChannel;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Single value in a report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn int(value: impl Into<i64>) -> Self {
        Self::Integer(value.into())
    }

    pub fn count(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }

    pub fn quantity(value: u64) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }

    /// Rounded to two decimal places.
    pub fn decimal(value: f64) -> Self {
        Self::Decimal((value * 100.0).round() / 100.0)
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, Self::Date)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value:.2}"),
            Self::Date(value) => write!(f, "{value}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Tabular output of a catalog query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub slug: &'static str,
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| *column == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub slug: &'static str,
    pub title: &'static str,
    pub requires_city: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSummary {
    pub providers: usize,
    pub receivers: usize,
    pub total_quantity: u64,
    pub claims: usize,
    pub matching_listings: usize,
    pub matching_claims: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDonation {
    pub provider_name: String,
    pub total_donated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub kpis: KpiSummary,
    pub top_providers: Vec<ProviderDonation>,
    pub status_breakdown: Vec<StatusShare>,
    pub listings: Vec<AnnotatedListing>,
}

/// Distinct values offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub provider_names: Vec<String>,
    pub food_types: Vec<String>,
    pub meal_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Provider,
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactEntry {
    pub party: Party,
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub city: String,
    pub contact: String,
    pub channel: ContactChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Summed quantity under one grouping label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelQuantity {
    pub label: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityShare {
    pub label: String,
    pub quantity: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityProviders {
    pub city: String,
    /// Distinct providers with at least one listing.
    pub providers: usize,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityClaims {
    pub city: String,
    pub claims: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryBucket {
    pub days_to_expiry: u32,
    pub quantity: u64,
}

/// Listed quantity by expiry month, food type and meal type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationsAnalysis {
    pub monthly: Vec<LabelQuantity>,
    pub food_types: Vec<LabelQuantity>,
    pub meal_types: Vec<QuantityShare>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInsights {
    pub top_providers: Vec<LabelQuantity>,
    pub provider_types: Vec<LabelQuantity>,
    pub by_city: Vec<CityProviders>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverInsights {
    pub top_receivers: Vec<LabelQuantity>,
    pub cities: Vec<CityClaims>,
}

/// Quantity at risk per days-to-expiry value, plus every expired listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WastageReport {
    pub today: NaiveDate,
    pub buckets: Vec<ExpiryBucket>,
    pub expired: Vec<AnnotatedListing>,
}
