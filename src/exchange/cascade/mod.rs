//! Cross-entity narrowing of listings and the claims that reference them.
//!
//! Listings are filtered first by every active predicate; claims are never
//! matched against city/provider/type directly and only survive when the
//! listing they point at survived.

mod predicates;

pub use predicates::FilterPredicates;

use super::domain::{index_by, Claim, Dataset, FoodId, FoodListing, Provider, ProviderId};
use super::expiry::{self, ExpiryStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Listings and claims that passed a cascade run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    pub listings: Vec<FoodListing>,
    pub claims: Vec<Claim>,
}

/// Listing row with its expiry view for `today` attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedListing {
    #[serde(flatten)]
    pub listing: FoodListing,
    #[serde(flatten)]
    pub expiry: ExpiryStatus,
}

impl CascadeOutcome {
    pub fn annotated(&self, today: NaiveDate) -> Vec<AnnotatedListing> {
        annotate(&self.listings, today)
    }

    pub fn total_quantity(&self) -> u64 {
        self.listings
            .iter()
            .map(|listing| u64::from(listing.quantity))
            .sum()
    }
}

pub fn annotate(listings: &[FoodListing], today: NaiveDate) -> Vec<AnnotatedListing> {
    listings
        .iter()
        .map(|listing| AnnotatedListing {
            expiry: expiry::normalize(listing.expiry_date, today),
            listing: listing.clone(),
        })
        .collect()
}

/// Run the cascade over raw collections.
pub fn apply(
    listings: &[FoodListing],
    claims: &[Claim],
    providers: &[Provider],
    predicates: &FilterPredicates,
    today: NaiveDate,
) -> CascadeOutcome {
    let matcher = ListingMatcher::compile(providers, predicates);

    let listings: Vec<FoodListing> = listings
        .iter()
        .filter(|listing| matcher.matches(listing, today))
        .cloned()
        .collect();

    let kept: HashSet<FoodId> = listings.iter().map(|listing| listing.id).collect();
    let receivers: HashSet<_> = predicates.receiver_ids.iter().copied().collect();

    let claims: Vec<Claim> = claims
        .iter()
        .filter(|claim| kept.contains(&claim.food_id))
        .filter(|claim| receivers.is_empty() || receivers.contains(&claim.receiver_id))
        .cloned()
        .collect();

    debug!(
        listings = listings.len(),
        claims = claims.len(),
        %today,
        "filter cascade applied"
    );

    CascadeOutcome { listings, claims }
}

impl Dataset {
    pub fn filter(&self, predicates: &FilterPredicates, today: NaiveDate) -> CascadeOutcome {
        apply(
            &self.listings,
            &self.claims,
            &self.providers,
            predicates,
            today,
        )
    }
}

/// Predicates resolved once against the provider table.
struct ListingMatcher<'a> {
    predicates: &'a FilterPredicates,
    city: Option<String>,
    provider_cities: HashMap<ProviderId, String>,
    named_providers: Option<HashSet<ProviderId>>,
}

impl<'a> ListingMatcher<'a> {
    fn compile(providers: &[Provider], predicates: &'a FilterPredicates) -> Self {
        let city = predicates.city.as_deref().map(city_key);

        let provider_cities = if city.is_some() {
            index_by(providers, |provider| provider.id)
                .into_iter()
                .map(|(id, provider)| (id, city_key(&provider.city)))
                .collect()
        } else {
            HashMap::new()
        };

        let named_providers = predicates.provider_name.as_deref().map(|name| {
            let name = name.trim();
            providers
                .iter()
                .filter(|provider| provider.name.trim() == name)
                .map(|provider| provider.id)
                .collect()
        });

        Self {
            predicates,
            city,
            provider_cities,
            named_providers,
        }
    }

    fn matches(&self, listing: &FoodListing, today: NaiveDate) -> bool {
        self.matches_city(listing)
            && self.matches_provider(listing)
            && allowed(&self.predicates.food_types, &listing.food_type)
            && allowed(&self.predicates.meal_types, &listing.meal_type)
            && self.matches_expiry(listing, today)
    }

    fn matches_city(&self, listing: &FoodListing) -> bool {
        let Some(city) = &self.city else {
            return true;
        };

        if city_key(&listing.location) == *city {
            return true;
        }

        self.provider_cities
            .get(&listing.provider_id)
            .is_some_and(|provider_city| provider_city == city)
    }

    fn matches_provider(&self, listing: &FoodListing) -> bool {
        self.named_providers
            .as_ref()
            .map_or(true, |ids| ids.contains(&listing.provider_id))
    }

    fn matches_expiry(&self, listing: &FoodListing, today: NaiveDate) -> bool {
        if !self.predicates.touches_expiry() {
            return true;
        }

        let status = expiry::normalize(listing.expiry_date, today);

        // unknown expiry is decided by the opt-in alone, whichever expiry predicate is active
        if status.is_unknown {
            return self.predicates.include_unknown_expiry;
        }

        if self.predicates.only_upcoming && status.is_expired {
            return false;
        }

        self.predicates
            .days_window
            .map_or(true, |window| status.within(window))
    }
}

fn city_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn allowed(choices: &[String], value: &str) -> bool {
    choices.is_empty() || choices.iter().any(|choice| choice == value)
}
