use super::queries;
use super::views::{CatalogEntry, ReportTable};
use crate::exchange::domain::Dataset;
use chrono::NaiveDate;
use serde::Serialize;

/// The fixed set of canned reports. Only [`ReportKind::ProviderContactsInCity`]
/// takes a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    PartiesPerCity,
    QuantityByProviderType,
    ProviderContactsInCity,
    ReceiversByClaims,
    TotalQuantity,
    TopListingCities,
    FoodTypeAvailability,
    ClaimsPerFoodItem,
    ProvidersByCompletedClaims,
    ClaimStatusDistribution,
    ReceiverClaimAverages,
    ClaimsByMealType,
    DonationsPerProvider,
    ExpiredListings,
    ExpiringSoon,
}

impl ReportKind {
    pub const fn ordered() -> [Self; 15] {
        [
            Self::PartiesPerCity,
            Self::QuantityByProviderType,
            Self::ProviderContactsInCity,
            Self::ReceiversByClaims,
            Self::TotalQuantity,
            Self::TopListingCities,
            Self::FoodTypeAvailability,
            Self::ClaimsPerFoodItem,
            Self::ProvidersByCompletedClaims,
            Self::ClaimStatusDistribution,
            Self::ReceiverClaimAverages,
            Self::ClaimsByMealType,
            Self::DonationsPerProvider,
            Self::ExpiredListings,
            Self::ExpiringSoon,
        ]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::PartiesPerCity => "parties-per-city",
            Self::QuantityByProviderType => "quantity-by-provider-type",
            Self::ProviderContactsInCity => "provider-contacts",
            Self::ReceiversByClaims => "receivers-by-claims",
            Self::TotalQuantity => "total-quantity",
            Self::TopListingCities => "top-listing-cities",
            Self::FoodTypeAvailability => "food-type-availability",
            Self::ClaimsPerFoodItem => "claims-per-food-item",
            Self::ProvidersByCompletedClaims => "providers-by-completed-claims",
            Self::ClaimStatusDistribution => "claim-status-distribution",
            Self::ReceiverClaimAverages => "receiver-claim-averages",
            Self::ClaimsByMealType => "claims-by-meal-type",
            Self::DonationsPerProvider => "donations-per-provider",
            Self::ExpiredListings => "expired-listings",
            Self::ExpiringSoon => "expiring-soon",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::PartiesPerCity => "Providers & receivers per city",
            Self::QuantityByProviderType => "Top contributing provider type (by quantity)",
            Self::ProviderContactsInCity => "Contact info of providers in a city",
            Self::ReceiversByClaims => "Receivers with most claims",
            Self::TotalQuantity => "Total quantity of food available",
            Self::TopListingCities => "Cities with the most listings",
            Self::FoodTypeAvailability => "Most commonly available food types",
            Self::ClaimsPerFoodItem => "Claims made per food item",
            Self::ProvidersByCompletedClaims => "Providers with the most completed claims",
            Self::ClaimStatusDistribution => "Claim status distribution (%)",
            Self::ReceiverClaimAverages => "Average quantity claimed per receiver",
            Self::ClaimsByMealType => "Most claimed meal type",
            Self::DonationsPerProvider => "Total quantity donated by each provider",
            Self::ExpiredListings => "Expired food listings",
            Self::ExpiringSoon => "Listings expiring within the next 3 days",
        }
    }

    pub const fn requires_city(self) -> bool {
        matches!(self, Self::ProviderContactsInCity)
    }

    /// Accepts the slug or the one-based catalog position (`"q3"`, `"3"`).
    pub fn from_slug(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let position = value.strip_prefix('q').unwrap_or(&value);
        if let Ok(index) = position.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|index| Self::ordered().get(index).copied());
        }

        Self::ordered()
            .into_iter()
            .find(|kind| kind.slug() == value)
    }

    pub fn entry(self) -> CatalogEntry {
        CatalogEntry {
            slug: self.slug(),
            title: self.title(),
            requires_city: self.requires_city(),
        }
    }

    pub fn catalog() -> Vec<CatalogEntry> {
        Self::ordered().into_iter().map(Self::entry).collect()
    }

    /// Evaluate the report against a snapshot. `city` is ignored by reports
    /// that take no parameter.
    pub fn run(
        self,
        dataset: &Dataset,
        city: Option<&str>,
        today: NaiveDate,
    ) -> Result<ReportTable, ReportError> {
        let (columns, rows) = match self {
            Self::PartiesPerCity => queries::parties_per_city(dataset),
            Self::QuantityByProviderType => queries::quantity_by_provider_type(dataset),
            Self::ProviderContactsInCity => {
                let city = city
                    .map(str::trim)
                    .filter(|city| !city.is_empty())
                    .ok_or(ReportError::MissingCity { report: self.slug() })?;
                queries::provider_contacts_in_city(dataset, city)
            }
            Self::ReceiversByClaims => queries::receivers_by_claims(dataset),
            Self::TotalQuantity => queries::total_quantity(dataset),
            Self::TopListingCities => queries::top_listing_cities(dataset),
            Self::FoodTypeAvailability => queries::food_type_availability(dataset),
            Self::ClaimsPerFoodItem => queries::claims_per_food_item(dataset),
            Self::ProvidersByCompletedClaims => queries::providers_by_completed_claims(dataset),
            Self::ClaimStatusDistribution => queries::claim_status_distribution(dataset),
            Self::ReceiverClaimAverages => queries::receiver_claim_averages(dataset),
            Self::ClaimsByMealType => queries::claims_by_meal_type(dataset),
            Self::DonationsPerProvider => queries::donations_per_provider(dataset),
            Self::ExpiredListings => queries::expired_listings(dataset, today),
            Self::ExpiringSoon => queries::expiring_soon(dataset, today),
        };

        Ok(ReportTable {
            slug: self.slug(),
            title: self.title(),
            columns,
            rows,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report '{0}'")]
    UnknownReport(String),
    #[error("report '{report}' requires a city")]
    MissingCity { report: &'static str },
    #[error("failed to export report as CSV: {0}")]
    Export(#[from] csv::Error),
}

/// Look up a report by slug and run it.
pub fn run_report(
    slug: &str,
    dataset: &Dataset,
    city: Option<&str>,
    today: NaiveDate,
) -> Result<ReportTable, ReportError> {
    let kind =
        ReportKind::from_slug(slug).ok_or_else(|| ReportError::UnknownReport(slug.to_string()))?;
    kind.run(dataset, city, today)
}
