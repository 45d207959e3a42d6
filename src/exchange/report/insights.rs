use super::views::{
    CityClaims, CityProviders, Cell, DonationsAnalysis, ExpiryBucket, LabelQuantity,
    ProviderInsights, QuantityShare, ReceiverInsights, ReportTable, WastageReport,
};
use crate::exchange::cascade::{annotate, FilterPredicates};
use crate::exchange::domain::{index_by, Dataset, ProviderId};
use crate::exchange::expiry;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

const TOP_PROVIDERS: usize = 20;
const TOP_RECEIVERS: usize = 20;

/// Month label for listings without a usable expiry date.
pub const UNKNOWN_MONTH: &str = "unknown";

fn sum_by<'a>(pairs: impl Iterator<Item = (&'a str, u64)>) -> Vec<LabelQuantity> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for (label, quantity) in pairs {
        *totals.entry(label).or_default() += quantity;
    }
    totals
        .into_iter()
        .map(|(label, quantity)| LabelQuantity {
            label: label.to_string(),
            quantity,
        })
        .collect()
}

/// Stable, so equal quantities stay in label order.
fn largest_first(mut rows: Vec<LabelQuantity>) -> Vec<LabelQuantity> {
    rows.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    rows
}

fn quantity_share(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        ((part as f64 * 100.0 / total as f64) * 100.0).round() / 100.0
    }
}

pub fn donations_analysis(dataset: &Dataset) -> DonationsAnalysis {
    let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
    let mut undated: Option<u64> = None;
    for listing in &dataset.listings {
        let quantity = u64::from(listing.quantity);
        match listing.expiry_date {
            Some(date) => {
                *monthly.entry(date.format("%Y-%m").to_string()).or_default() += quantity
            }
            None => *undated.get_or_insert(0) += quantity,
        }
    }

    let mut monthly: Vec<LabelQuantity> = monthly
        .into_iter()
        .map(|(label, quantity)| LabelQuantity { label, quantity })
        .collect();
    if let Some(quantity) = undated {
        monthly.push(LabelQuantity {
            label: UNKNOWN_MONTH.to_string(),
            quantity,
        });
    }

    let quantities = || {
        dataset
            .listings
            .iter()
            .map(|listing| (listing, u64::from(listing.quantity)))
    };
    let food_types = largest_first(sum_by(
        quantities().map(|(listing, quantity)| (listing.food_type.as_str(), quantity)),
    ));

    let meals = sum_by(
        quantities().map(|(listing, quantity)| (listing.meal_type.as_str(), quantity)),
    );
    let total: u64 = meals.iter().map(|meal| meal.quantity).sum();
    let meal_types = meals
        .into_iter()
        .map(|meal| QuantityShare {
            percentage: quantity_share(meal.quantity, total),
            label: meal.label,
            quantity: meal.quantity,
        })
        .collect();

    DonationsAnalysis {
        monthly,
        food_types,
        meal_types,
    }
}

/// Listings joined to their provider; listings whose provider does not
/// resolve are left out of every grouping.
pub fn provider_insights(dataset: &Dataset) -> ProviderInsights {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let resolved: Vec<_> = dataset
        .listings
        .iter()
        .filter_map(|listing| {
            providers
                .get(&listing.provider_id)
                .map(|provider| (*provider, u64::from(listing.quantity)))
        })
        .collect();

    let mut top_providers = largest_first(sum_by(
        resolved
            .iter()
            .map(|(provider, quantity)| (provider.name.as_str(), *quantity)),
    ));
    top_providers.truncate(TOP_PROVIDERS);

    let provider_types = largest_first(sum_by(
        resolved
            .iter()
            .map(|(provider, quantity)| (provider.kind.as_str(), *quantity)),
    ));

    let mut cities: BTreeMap<&str, (HashSet<ProviderId>, u64)> = BTreeMap::new();
    for (provider, quantity) in &resolved {
        let entry = cities.entry(provider.city.as_str()).or_default();
        entry.0.insert(provider.id);
        entry.1 += quantity;
    }
    let mut by_city: Vec<CityProviders> = cities
        .into_iter()
        .map(|(city, (ids, total_quantity))| CityProviders {
            city: city.to_string(),
            providers: ids.len(),
            total_quantity,
        })
        .collect();
    by_city.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

    ProviderInsights {
        top_providers,
        provider_types,
        by_city,
    }
}

/// Claims joined to receiver and listing. Claims on a missing listing count
/// toward the receiver's claims with zero quantity; claims by an unknown
/// receiver are skipped.
pub fn receiver_insights(dataset: &Dataset) -> ReceiverInsights {
    let receivers = index_by(&dataset.receivers, |receiver| receiver.id);
    let listings = index_by(&dataset.listings, |listing| listing.id);

    let mut claimed: BTreeMap<&str, u64> = BTreeMap::new();
    let mut cities: BTreeMap<&str, usize> = BTreeMap::new();
    for claim in &dataset.claims {
        let Some(receiver) = receivers.get(&claim.receiver_id) else {
            continue;
        };
        let quantity = listings
            .get(&claim.food_id)
            .map_or(0, |listing| u64::from(listing.quantity));
        *claimed.entry(receiver.name.as_str()).or_default() += quantity;
        *cities.entry(receiver.city.as_str()).or_default() += 1;
    }

    let mut top_receivers = largest_first(
        claimed
            .into_iter()
            .map(|(label, quantity)| LabelQuantity {
                label: label.to_string(),
                quantity,
            })
            .collect(),
    );
    top_receivers.truncate(TOP_RECEIVERS);

    let mut cities: Vec<CityClaims> = cities
        .into_iter()
        .map(|(city, claims)| CityClaims {
            city: city.to_string(),
            claims,
        })
        .collect();
    cities.sort_by(|a, b| b.claims.cmp(&a.claims));

    ReceiverInsights {
        top_receivers,
        cities,
    }
}

/// Quantity per days-to-expiry value for the listings the cascade keeps.
/// Unknown expiry has no bucket. The expired list ignores the predicates.
pub fn wastage(
    dataset: &Dataset,
    predicates: &FilterPredicates,
    today: NaiveDate,
) -> WastageReport {
    let outcome = dataset.filter(predicates, today);
    let mut buckets: BTreeMap<u32, u64> = BTreeMap::new();
    for listing in &outcome.listings {
        if let Some(days) = expiry::normalize(listing.expiry_date, today).days_to_expiry {
            *buckets.entry(days).or_default() += u64::from(listing.quantity);
        }
    }

    let mut expired: Vec<_> = annotate(&dataset.listings, today)
        .into_iter()
        .filter(|entry| entry.expiry.is_expired)
        .collect();
    expired.sort_by_key(|entry| entry.listing.expiry_date);

    WastageReport {
        today,
        buckets: buckets
            .into_iter()
            .map(|(days_to_expiry, quantity)| ExpiryBucket {
                days_to_expiry,
                quantity,
            })
            .collect(),
        expired,
    }
}

fn label_table(
    slug: &'static str,
    title: &'static str,
    label: &'static str,
    rows: &[LabelQuantity],
) -> ReportTable {
    ReportTable {
        slug,
        title,
        columns: vec![label, "Quantity"],
        rows: rows
            .iter()
            .map(|row| vec![Cell::text(&row.label), Cell::quantity(row.quantity)])
            .collect(),
    }
}

impl DonationsAnalysis {
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            label_table(
                "monthly-quantity",
                "Monthly quantity listed",
                "YearMonth",
                &self.monthly,
            ),
            label_table(
                "food-type-quantity",
                "Food type distribution (quantity)",
                "Food_Type",
                &self.food_types,
            ),
            ReportTable {
                slug: "meal-type-share",
                title: "Meal type share",
                columns: vec!["Meal_Type", "Quantity", "Percentage"],
                rows: self
                    .meal_types
                    .iter()
                    .map(|share| {
                        vec![
                            Cell::text(&share.label),
                            Cell::quantity(share.quantity),
                            Cell::decimal(share.percentage),
                        ]
                    })
                    .collect(),
            },
        ]
    }
}

impl ProviderInsights {
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            label_table(
                "top-providers-by-quantity",
                "Top providers (quantity)",
                "Provider_Name",
                &self.top_providers,
            ),
            label_table(
                "provider-type-contribution",
                "Provider type contribution",
                "Provider_Type",
                &self.provider_types,
            ),
            ReportTable {
                slug: "providers-by-city",
                title: "Providers by city (count vs quantity)",
                columns: vec!["City", "Providers", "Total_Quantity"],
                rows: self
                    .by_city
                    .iter()
                    .map(|city| {
                        vec![
                            Cell::text(&city.city),
                            Cell::count(city.providers),
                            Cell::quantity(city.total_quantity),
                        ]
                    })
                    .collect(),
            },
        ]
    }
}

impl ReceiverInsights {
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            label_table(
                "top-receivers-by-quantity",
                "Top receivers by claimed quantity",
                "Receiver_Name",
                &self.top_receivers,
            ),
            ReportTable {
                slug: "receiver-city-claims",
                title: "Receiver cities (claims count)",
                columns: vec!["City", "Claims"],
                rows: self
                    .cities
                    .iter()
                    .map(|city| vec![Cell::text(&city.city), Cell::count(city.claims)])
                    .collect(),
            },
        ]
    }
}

impl WastageReport {
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            ReportTable {
                slug: "quantity-by-days-to-expiry",
                title: "Quantity by days to expiry (absolute)",
                columns: vec!["Days_To_Expiry", "Quantity"],
                rows: self
                    .buckets
                    .iter()
                    .map(|bucket| {
                        vec![Cell::int(bucket.days_to_expiry), Cell::quantity(bucket.quantity)]
                    })
                    .collect(),
            },
            ReportTable {
                slug: "expired-listings",
                title: "Expired listings",
                columns: vec![
                    "Food_ID",
                    "Food_Name",
                    "Quantity",
                    "Expiry_Date",
                    "Location",
                    "Food_Type",
                    "Meal_Type",
                    "Days_To_Expiry",
                ],
                rows: self
                    .expired
                    .iter()
                    .map(|entry| {
                        let listing = &entry.listing;
                        vec![
                            Cell::int(listing.id.0),
                            Cell::text(&listing.name),
                            Cell::int(listing.quantity),
                            Cell::date(listing.expiry_date),
                            Cell::text(&listing.location),
                            Cell::text(&listing.food_type),
                            Cell::text(&listing.meal_type),
                            entry.expiry.days_to_expiry.map_or(Cell::Empty, Cell::int),
                        ]
                    })
                    .collect(),
            },
        ]
    }
}
