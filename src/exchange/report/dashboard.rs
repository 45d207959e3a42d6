use super::queries::{donations_by_provider, percentage, status_counts};
use super::views::{
    ContactEntry, DashboardSummary, FilterOptions, KpiSummary, Party, ProviderDonation,
    StatusShare,
};
use crate::exchange::cascade::FilterPredicates;
use crate::exchange::domain::{index_by, ContactChannel, Dataset};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

const TOP_PROVIDERS: usize = 15;

/// Headline figures, donor ranking and the filtered listings for one view.
///
/// KPI counts for providers, receivers and claims cover the whole snapshot;
/// quantity and the listing table follow the cascade.
pub fn dashboard(
    dataset: &Dataset,
    predicates: &FilterPredicates,
    today: NaiveDate,
) -> DashboardSummary {
    let outcome = dataset.filter(predicates, today);

    let kpis = KpiSummary {
        providers: dataset.providers.len(),
        receivers: dataset.receivers.len(),
        total_quantity: outcome.total_quantity(),
        claims: dataset.claims.len(),
        matching_listings: outcome.listings.len(),
        matching_claims: outcome.claims.len(),
    };

    let mut listings = outcome.annotated(today);
    // unknown expiry sorts last
    listings.sort_by_key(|entry| {
        (
            entry.expiry.days_to_expiry.is_none(),
            entry.expiry.days_to_expiry,
        )
    });

    DashboardSummary {
        today,
        kpis,
        top_providers: top_providers(dataset),
        status_breakdown: status_breakdown(dataset),
        listings,
    }
}

/// Donated quantity grouped by provider name, largest first.
pub fn top_providers(dataset: &Dataset) -> Vec<ProviderDonation> {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut by_name: BTreeMap<&str, u64> = BTreeMap::new();
    for (id, total) in donations_by_provider(dataset) {
        *by_name.entry(providers[&id].name.as_str()).or_default() += total;
    }

    let mut donations: Vec<ProviderDonation> = by_name
        .into_iter()
        .map(|(name, total)| ProviderDonation {
            provider_name: name.to_string(),
            total_donated: total,
        })
        .collect();
    donations.sort_by(|a, b| b.total_donated.cmp(&a.total_donated));
    donations.truncate(TOP_PROVIDERS);
    donations
}

pub fn status_breakdown(dataset: &Dataset) -> Vec<StatusShare> {
    let total = dataset.claims.len();
    status_counts(&dataset.claims)
        .into_iter()
        .map(|(status, count)| StatusShare {
            status,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

impl FilterOptions {
    /// Sorted distinct values; cities merge provider, receiver and listing locations.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            values
                .filter(|value| !value.is_empty())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let cities = dataset
            .providers
            .iter()
            .map(|provider| &provider.city)
            .chain(dataset.receivers.iter().map(|receiver| &receiver.city))
            .chain(dataset.listings.iter().map(|listing| &listing.location));

        Self {
            cities: distinct(cities),
            provider_names: distinct(dataset.providers.iter().map(|provider| &provider.name)),
            food_types: distinct(dataset.listings.iter().map(|listing| &listing.food_type)),
            meal_types: distinct(dataset.listings.iter().map(|listing| &listing.meal_type)),
        }
    }
}

/// Providers then receivers, optionally restricted to a city (case-insensitive).
pub fn contact_directory(dataset: &Dataset, city: Option<&str>) -> Vec<ContactEntry> {
    let city = city.map(|city| city.trim().to_lowercase());
    let in_city = |value: &str| {
        city.as_deref()
            .map_or(true, |city| value.trim().to_lowercase() == city)
    };

    let providers = dataset
        .providers
        .iter()
        .filter(|provider| in_city(&provider.city))
        .map(|provider| ContactEntry {
            party: Party::Provider,
            id: provider.id.0,
            name: provider.name.clone(),
            kind: provider.kind.clone(),
            city: provider.city.clone(),
            contact: provider.contact.clone(),
            channel: ContactChannel::classify(&provider.contact),
            href: ContactChannel::href(&provider.contact),
        });

    let receivers = dataset
        .receivers
        .iter()
        .filter(|receiver| in_city(&receiver.city))
        .map(|receiver| ContactEntry {
            party: Party::Receiver,
            id: receiver.id.0,
            name: receiver.name.clone(),
            kind: receiver.kind.clone(),
            city: receiver.city.clone(),
            contact: receiver.contact.clone(),
            channel: ContactChannel::classify(&receiver.contact),
            href: ContactChannel::href(&receiver.contact),
        });

    providers.chain(receivers).collect()
}
