use super::views::Cell;
use crate::exchange::domain::{index_by, Claim, Dataset, FoodId, ProviderId, ReceiverId};
use crate::exchange::expiry;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub(crate) type Table = (Vec<&'static str>, Vec<Vec<Cell>>);

const TOP_CITIES: usize = 10;
const TOP_COMPLETED_PROVIDERS: usize = 10;
const TOP_RECEIVERS: usize = 50;
const TOP_DONORS: usize = 50;
const EXPIRING_SOON_DAYS: i64 = 3;

/// Stable descending sort; groups collected from a `BTreeMap` keep their
/// key order among ties.
fn sort_desc<K: Ord, F: Fn(&Vec<Cell>) -> K>(rows: &mut [Vec<Cell>], key: F) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn int_at(index: usize) -> impl Fn(&Vec<Cell>) -> i64 {
    move |row| row[index].as_i64().unwrap_or(0)
}

pub(crate) fn parties_per_city(dataset: &Dataset) -> Table {
    let mut cities: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for provider in &dataset.providers {
        cities.entry(provider.city.as_str()).or_default().0 += 1;
    }
    for receiver in &dataset.receivers {
        cities.entry(receiver.city.as_str()).or_default().1 += 1;
    }

    let mut rows: Vec<Vec<Cell>> = cities
        .into_iter()
        .map(|(city, (providers, receivers))| {
            vec![Cell::text(city), Cell::count(providers), Cell::count(receivers)]
        })
        .collect();
    sort_desc(&mut rows, int_at(1));

    (vec!["City", "Providers_Count", "Receivers_Count"], rows)
}

pub(crate) fn quantity_by_provider_type(dataset: &Dataset) -> Table {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for listing in &dataset.listings {
        *totals.entry(listing.provider_type.as_str()).or_default() += u64::from(listing.quantity);
    }

    let mut rows: Vec<Vec<Cell>> = totals
        .into_iter()
        .map(|(kind, total)| vec![Cell::text(kind), Cell::quantity(total)])
        .collect();
    sort_desc(&mut rows, int_at(1));

    (vec!["Provider_Type", "Total_Quantity"], rows)
}

pub(crate) fn provider_contacts_in_city(dataset: &Dataset, city: &str) -> Table {
    let city = city.trim().to_lowercase();
    let rows = dataset
        .providers
        .iter()
        .filter(|provider| provider.city.trim().to_lowercase() == city)
        .map(|provider| {
            vec![
                Cell::text(&provider.name),
                Cell::text(&provider.kind),
                Cell::text(&provider.city),
                Cell::text(&provider.contact),
            ]
        })
        .collect();

    (vec!["Name", "Type", "City", "Contact"], rows)
}

pub(crate) fn receivers_by_claims(dataset: &Dataset) -> Table {
    let receivers = index_by(&dataset.receivers, |receiver| receiver.id);
    let mut counts: BTreeMap<ReceiverId, usize> = BTreeMap::new();
    for claim in &dataset.claims {
        if receivers.contains_key(&claim.receiver_id) {
            *counts.entry(claim.receiver_id).or_default() += 1;
        }
    }

    let mut rows: Vec<Vec<Cell>> = counts
        .into_iter()
        .map(|(id, count)| {
            let receiver = receivers[&id];
            vec![
                Cell::int(id.0),
                Cell::text(&receiver.name),
                Cell::text(&receiver.city),
                Cell::count(count),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(3));

    (vec!["Receiver_ID", "Name", "City", "Total_Claims"], rows)
}

pub(crate) fn total_quantity(dataset: &Dataset) -> Table {
    let total: u64 = dataset
        .listings
        .iter()
        .map(|listing| u64::from(listing.quantity))
        .sum();
    (vec!["Total_Quantity"], vec![vec![Cell::quantity(total)]])
}

pub(crate) fn top_listing_cities(dataset: &Dataset) -> Table {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for listing in &dataset.listings {
        *counts.entry(listing.location.as_str()).or_default() += 1;
    }

    let mut rows: Vec<Vec<Cell>> = counts
        .into_iter()
        .map(|(city, count)| vec![Cell::text(city), Cell::count(count)])
        .collect();
    sort_desc(&mut rows, int_at(1));
    rows.truncate(TOP_CITIES);

    (vec!["City", "Listings_Count"], rows)
}

pub(crate) fn food_type_availability(dataset: &Dataset) -> Table {
    let mut types: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for listing in &dataset.listings {
        let entry = types.entry(listing.food_type.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u64::from(listing.quantity);
    }

    let mut rows: Vec<Vec<Cell>> = types
        .into_iter()
        .map(|(food_type, (occurrences, quantity))| {
            vec![
                Cell::text(food_type),
                Cell::count(occurrences),
                Cell::quantity(quantity),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(1));

    (vec!["Food_Type", "Occurrences", "Total_Quantity"], rows)
}

pub(crate) fn claims_per_food_item(dataset: &Dataset) -> Table {
    let mut counts: HashMap<FoodId, usize> = HashMap::new();
    for claim in &dataset.claims {
        *counts.entry(claim.food_id).or_default() += 1;
    }

    let mut rows: Vec<Vec<Cell>> = dataset
        .listings
        .iter()
        .map(|listing| {
            vec![
                Cell::int(listing.id.0),
                Cell::text(&listing.name),
                Cell::count(counts.get(&listing.id).copied().unwrap_or(0)),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(2));

    (vec!["Food_ID", "Food_Name", "Claims_Count"], rows)
}

pub(crate) fn providers_by_completed_claims(dataset: &Dataset) -> Table {
    let listings = index_by(&dataset.listings, |listing| listing.id);
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut counts: BTreeMap<ProviderId, usize> = BTreeMap::new();

    for claim in dataset.claims.iter().filter(|claim| claim.status.is_completed()) {
        let Some(listing) = listings.get(&claim.food_id) else {
            continue;
        };
        if providers.contains_key(&listing.provider_id) {
            *counts.entry(listing.provider_id).or_default() += 1;
        }
    }

    let mut rows: Vec<Vec<Cell>> = counts
        .into_iter()
        .map(|(id, count)| {
            let provider = providers[&id];
            vec![
                Cell::int(id.0),
                Cell::text(&provider.name),
                Cell::text(&provider.city),
                Cell::count(count),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(3));
    rows.truncate(TOP_COMPLETED_PROVIDERS);

    (vec!["Provider_ID", "Name", "City", "Completed_Claims"], rows)
}

/// Claim counts per status label, label order.
pub(crate) fn status_counts(claims: &[Claim]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for claim in claims {
        *counts.entry(claim.status.label()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ((part as f64 * 100.0 / total as f64) * 100.0).round() / 100.0
    }
}

pub(crate) fn claim_status_distribution(dataset: &Dataset) -> Table {
    let total = dataset.claims.len();
    let rows = status_counts(&dataset.claims)
        .into_iter()
        .map(|(status, count)| {
            vec![
                Cell::Text(status),
                Cell::count(count),
                Cell::Decimal(percentage(count, total)),
            ]
        })
        .collect();

    (vec!["Status", "Count", "Percentage"], rows)
}

pub(crate) fn receiver_claim_averages(dataset: &Dataset) -> Table {
    let receivers = index_by(&dataset.receivers, |receiver| receiver.id);
    let listings = index_by(&dataset.listings, |listing| listing.id);
    let mut totals: BTreeMap<ReceiverId, (u64, usize)> = BTreeMap::new();

    for claim in &dataset.claims {
        let (Some(_), Some(listing)) = (
            receivers.get(&claim.receiver_id),
            listings.get(&claim.food_id),
        ) else {
            continue;
        };
        let entry = totals.entry(claim.receiver_id).or_default();
        entry.0 += u64::from(listing.quantity);
        entry.1 += 1;
    }

    let mut rows: Vec<Vec<Cell>> = totals
        .into_iter()
        .map(|(id, (quantity, claims))| {
            vec![
                Cell::int(id.0),
                Cell::text(&receivers[&id].name),
                Cell::decimal(quantity as f64 / claims as f64),
                Cell::quantity(quantity),
                Cell::count(claims),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(3));
    rows.truncate(TOP_RECEIVERS);

    (
        vec![
            "Receiver_ID",
            "Name",
            "Avg_Quantity",
            "Total_Quantity",
            "Claim_Count",
        ],
        rows,
    )
}

pub(crate) fn claims_by_meal_type(dataset: &Dataset) -> Table {
    let listings = index_by(&dataset.listings, |listing| listing.id);
    let mut meals: BTreeMap<&str, (usize, u64)> = BTreeMap::new();

    for claim in &dataset.claims {
        if let Some(listing) = listings.get(&claim.food_id) {
            let entry = meals.entry(listing.meal_type.as_str()).or_default();
            entry.0 += 1;
            entry.1 += u64::from(listing.quantity);
        }
    }

    let mut rows: Vec<Vec<Cell>> = meals
        .into_iter()
        .map(|(meal, (claims, quantity))| {
            vec![Cell::text(meal), Cell::count(claims), Cell::quantity(quantity)]
        })
        .collect();
    sort_desc(&mut rows, int_at(1));

    (vec!["Meal_Type", "Claims_Count", "Total_Quantity"], rows)
}

/// Quantity listed per resolvable provider id, id order.
pub(crate) fn donations_by_provider(dataset: &Dataset) -> BTreeMap<ProviderId, u64> {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut totals: BTreeMap<ProviderId, u64> = BTreeMap::new();
    for listing in &dataset.listings {
        if providers.contains_key(&listing.provider_id) {
            *totals.entry(listing.provider_id).or_default() += u64::from(listing.quantity);
        }
    }
    totals
}

pub(crate) fn donations_per_provider(dataset: &Dataset) -> Table {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut rows: Vec<Vec<Cell>> = donations_by_provider(dataset)
        .into_iter()
        .map(|(id, total)| {
            let provider = providers[&id];
            vec![
                Cell::int(id.0),
                Cell::text(&provider.name),
                Cell::text(&provider.city),
                Cell::quantity(total),
            ]
        })
        .collect();
    sort_desc(&mut rows, int_at(3));
    rows.truncate(TOP_DONORS);

    (vec!["Provider_ID", "Name", "City", "Total_Donated"], rows)
}

pub(crate) fn expired_listings(dataset: &Dataset, today: NaiveDate) -> Table {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut expired: Vec<_> = dataset
        .listings
        .iter()
        .filter(|listing| expiry::normalize(listing.expiry_date, today).is_expired)
        .collect();
    expired.sort_by_key(|listing| listing.expiry_date);

    let rows = expired
        .into_iter()
        .map(|listing| {
            vec![
                Cell::int(listing.id.0),
                Cell::text(&listing.name),
                Cell::int(listing.quantity),
                Cell::date(listing.expiry_date),
                providers
                    .get(&listing.provider_id)
                    .map_or(Cell::Empty, |provider| Cell::text(&provider.name)),
                Cell::text(&listing.location),
            ]
        })
        .collect();

    (
        vec![
            "Food_ID",
            "Food_Name",
            "Quantity",
            "Expiry_Date",
            "Provider_Name",
            "Location",
        ],
        rows,
    )
}

/// Upcoming only: the signed difference must fall in `[0, 3]`.
pub(crate) fn expiring_soon(dataset: &Dataset, today: NaiveDate) -> Table {
    let providers = index_by(&dataset.providers, |provider| provider.id);
    let mut soon: Vec<_> = dataset
        .listings
        .iter()
        .filter_map(|listing| {
            let status = expiry::normalize(listing.expiry_date, today);
            match status.signed_days() {
                Some(days) if (0..=EXPIRING_SOON_DAYS).contains(&days) => Some((listing, status)),
                _ => None,
            }
        })
        .collect();
    soon.sort_by_key(|(_, status)| status.days_to_expiry);

    let rows = soon
        .into_iter()
        .map(|(listing, status)| {
            vec![
                Cell::int(listing.id.0),
                Cell::text(&listing.name),
                Cell::int(listing.quantity),
                Cell::date(listing.expiry_date),
                providers
                    .get(&listing.provider_id)
                    .map_or(Cell::Empty, |provider| Cell::text(&provider.name)),
                Cell::text(&listing.location),
                status.days_to_expiry.map_or(Cell::Empty, Cell::int),
            ]
        })
        .collect();

    (
        vec![
            "Food_ID",
            "Food_Name",
            "Quantity",
            "Expiry_Date",
            "Provider_Name",
            "Location",
            "Days_To_Expiry",
        ],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::domain::{ClaimId, ClaimStatus, FoodListing, Provider, Receiver};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    fn provider(id: u32, name: &str, kind: &str, city: &str) -> Provider {
        Provider {
            id: ProviderId(id),
            name: name.to_string(),
            kind: kind.to_string(),
            address: None,
            city: city.to_string(),
            contact: format!("contact-{id}@example.org"),
        }
    }

    fn receiver(id: u32, name: &str, city: &str) -> Receiver {
        Receiver {
            id: ReceiverId(id),
            name: name.to_string(),
            kind: "Charity".to_string(),
            city: city.to_string(),
            contact: String::new(),
        }
    }

    struct Listing<'a> {
        provider: u32,
        quantity: u32,
        offset: Option<i64>,
        location: &'a str,
        provider_type: &'a str,
        food_type: &'a str,
        meal_type: &'a str,
    }

    fn listing(id: u32, spec: Listing<'_>) -> FoodListing {
        FoodListing {
            id: FoodId(id),
            name: format!("Item {id}"),
            quantity: spec.quantity,
            expiry_date: spec.offset.map(|days| today() + Duration::days(days)),
            provider_id: ProviderId(spec.provider),
            provider_type: spec.provider_type.to_string(),
            location: spec.location.to_string(),
            food_type: spec.food_type.to_string(),
            meal_type: spec.meal_type.to_string(),
        }
    }

    fn claim(id: u32, food: u32, receiver: u32, status: ClaimStatus) -> Claim {
        Claim {
            id: ClaimId(id),
            food_id: FoodId(food),
            receiver_id: ReceiverId(receiver),
            status,
            timestamp: None,
        }
    }

    /// Provider 9, receiver 77 and food 999 are referenced but never defined.
    fn dataset() -> Dataset {
        use ClaimStatus::{Cancelled, Completed, Pending};

        Dataset {
            providers: vec![
                provider(1, "Alpha Foods", "Restaurant", "Springfield"),
                provider(2, "Beta Bakery", "Bakery", "Shelbyville"),
                provider(3, "Gamma Grocers", "Grocery Store", "Springfield"),
            ],
            receivers: vec![
                receiver(1, "Food Bank", "Springfield"),
                receiver(2, "Night Shelter", "Ogden"),
            ],
            listings: vec![
                listing(1, Listing {
                    provider: 1,
                    quantity: 10,
                    offset: Some(-2),
                    location: "Springfield",
                    provider_type: "Restaurant",
                    food_type: "Vegan",
                    meal_type: "Lunch",
                }),
                listing(2, Listing {
                    provider: 2,
                    quantity: 20,
                    offset: Some(1),
                    location: "Shelbyville",
                    provider_type: "Bakery",
                    food_type: "Vegetarian",
                    meal_type: "Breakfast",
                }),
                listing(3, Listing {
                    provider: 3,
                    quantity: 5,
                    offset: Some(3),
                    location: "Springfield",
                    provider_type: "Grocery Store",
                    food_type: "Vegan",
                    meal_type: "Dinner",
                }),
                listing(4, Listing {
                    provider: 9,
                    quantity: 7,
                    offset: Some(-1),
                    location: "Ogden",
                    provider_type: "Restaurant",
                    food_type: "Non-Vegetarian",
                    meal_type: "Lunch",
                }),
                listing(5, Listing {
                    provider: 1,
                    quantity: 8,
                    offset: None,
                    location: "Ogden",
                    provider_type: "Restaurant",
                    food_type: "Vegan",
                    meal_type: "Dinner",
                }),
            ],
            claims: vec![
                claim(1, 1, 1, Completed),
                claim(2, 2, 1, Completed),
                claim(3, 2, 2, Pending),
                claim(4, 999, 1, Completed),
                claim(5, 3, 77, Cancelled),
                claim(6, 4, 2, Completed),
                claim(7, 1, 2, Cancelled),
            ],
        }
    }

    /// Fifty-five of everything, so every top-N cutoff bites.
    fn bulk_dataset() -> Dataset {
        const SIZE: u32 = 55;
        let mut dataset = Dataset::default();

        for i in 1..=SIZE {
            let town = format!("Town {i:02}");
            dataset
                .providers
                .push(provider(i, &format!("Provider {i:02}"), "Restaurant", &town));
            dataset
                .receivers
                .push(receiver(i, &format!("Receiver {i:02}"), &town));
            dataset.listings.push(listing(i, Listing {
                provider: i,
                quantity: i,
                offset: Some(5),
                location: &town,
                provider_type: "Restaurant",
                food_type: "Vegan",
                meal_type: "Lunch",
            }));
            dataset.claims.push(claim(i, i, i, ClaimStatus::Completed));
        }

        dataset.listings.push(listing(56, Listing {
            provider: SIZE,
            quantity: 1,
            offset: Some(5),
            location: "Town 55",
            provider_type: "Restaurant",
            food_type: "Vegan",
            meal_type: "Lunch",
        }));
        dataset.claims.push(claim(56, 56, SIZE, ClaimStatus::Completed));
        for id in 57..=60 {
            dataset.claims.push(claim(id, 1, 1, ClaimStatus::Pending));
        }
        dataset
    }

    fn rendered((_, rows): &Table) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect()
    }

    fn ids((_, rows): &Table) -> Vec<i64> {
        rows.iter().filter_map(|row| row[0].as_i64()).collect()
    }

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn parties_per_city_ranks_by_provider_count() {
        assert_eq!(
            rendered(&parties_per_city(&dataset())),
            strings(&[
                &["Springfield", "2", "1"],
                &["Shelbyville", "1", "0"],
                &["Ogden", "0", "1"],
            ])
        );
    }

    #[test]
    fn quantity_by_provider_type_uses_the_listing_type() {
        // listing 4 has no registered provider but still carries a type
        assert_eq!(
            rendered(&quantity_by_provider_type(&dataset())),
            strings(&[
                &["Restaurant", "25"],
                &["Bakery", "20"],
                &["Grocery Store", "5"],
            ])
        );
    }

    #[test]
    fn provider_contacts_match_city_case_insensitively() {
        let table = provider_contacts_in_city(&dataset(), "  SPRINGFIELD ");
        let names: Vec<String> = rendered(&table)
            .into_iter()
            .map(|row| row[0].clone())
            .collect();
        assert_eq!(names, vec!["Alpha Foods", "Gamma Grocers"]);
        assert!(provider_contacts_in_city(&dataset(), "Nowhere").1.is_empty());
    }

    #[test]
    fn receivers_by_claims_drop_unknown_receivers() {
        // receiver 77 is never registered; equal counts stay in id order
        assert_eq!(
            rendered(&receivers_by_claims(&dataset())),
            strings(&[
                &["1", "Food Bank", "Springfield", "3"],
                &["2", "Night Shelter", "Ogden", "3"],
            ])
        );
    }

    #[test]
    fn total_quantity_sums_every_listing() {
        assert_eq!(rendered(&total_quantity(&dataset())), strings(&[&["50"]]));
        assert_eq!(rendered(&total_quantity(&Dataset::default())), strings(&[&["0"]]));
    }

    #[test]
    fn top_listing_cities_break_ties_by_name_and_stop_at_ten() {
        assert_eq!(
            rendered(&top_listing_cities(&dataset())),
            strings(&[&["Ogden", "2"], &["Springfield", "2"], &["Shelbyville", "1"]])
        );

        let bulk = rendered(&top_listing_cities(&bulk_dataset()));
        assert_eq!(bulk.len(), TOP_CITIES);
        assert_eq!(bulk[0], vec!["Town 55", "2"]);
        assert_eq!(bulk[9], vec!["Town 09", "1"]);
    }

    #[test]
    fn food_type_availability_counts_occurrences_and_quantity() {
        assert_eq!(
            rendered(&food_type_availability(&dataset())),
            strings(&[
                &["Vegan", "3", "23"],
                &["Non-Vegetarian", "1", "7"],
                &["Vegetarian", "1", "20"],
            ])
        );
    }

    #[test]
    fn claims_per_food_item_keeps_unclaimed_listings() {
        let table = claims_per_food_item(&dataset());
        assert_eq!(ids(&table), vec![1, 2, 3, 4, 5]);
        assert_eq!(table.1[4][2], Cell::Integer(0));
        // the claim on food 999 has no row of its own
        assert_eq!(table.1.iter().filter_map(|row| row[2].as_i64()).sum::<i64>(), 6);
    }

    #[test]
    fn completed_claims_skip_dangling_listings_and_providers() {
        // claim 4 points at food 999, claim 6 at a listing with no provider
        assert_eq!(
            rendered(&providers_by_completed_claims(&dataset())),
            strings(&[
                &["1", "Alpha Foods", "Springfield", "1"],
                &["2", "Beta Bakery", "Shelbyville", "1"],
            ])
        );
    }

    #[test]
    fn completed_claims_ignore_other_statuses_and_stop_at_ten() {
        let table = providers_by_completed_claims(&bulk_dataset());
        assert_eq!(table.1.len(), TOP_COMPLETED_PROVIDERS);
        assert_eq!(ids(&table), vec![55, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(table.1[0][3], Cell::Integer(2));
        // provider 1 also has four pending claims
        assert_eq!(table.1[1][3], Cell::Integer(1));
    }

    #[test]
    fn status_distribution_rounds_percentages() {
        let (_, rows) = claim_status_distribution(&dataset());
        assert_eq!(
            rows,
            vec![
                vec![Cell::text("Cancelled"), Cell::Integer(2), Cell::Decimal(28.57)],
                vec![Cell::text("Completed"), Cell::Integer(4), Cell::Decimal(57.14)],
                vec![Cell::text("Pending"), Cell::Integer(1), Cell::Decimal(14.29)],
            ]
        );
        assert!(claim_status_distribution(&Dataset::default()).1.is_empty());
        assert_eq!(percentage(1, 0), 0.0);
    }

    #[test]
    fn receiver_averages_round_to_two_places() {
        let (_, rows) = receiver_claim_averages(&dataset());
        assert_eq!(
            rows,
            vec![
                vec![
                    Cell::Integer(2),
                    Cell::text("Night Shelter"),
                    Cell::Decimal(12.33),
                    Cell::Integer(37),
                    Cell::Integer(3),
                ],
                vec![
                    Cell::Integer(1),
                    Cell::text("Food Bank"),
                    Cell::Decimal(15.0),
                    Cell::Integer(30),
                    Cell::Integer(2),
                ],
            ]
        );
    }

    #[test]
    fn receiver_averages_stop_at_fifty() {
        let table = receiver_claim_averages(&bulk_dataset());
        assert_eq!(table.1.len(), TOP_RECEIVERS);
        assert_eq!(table.1[0][0], Cell::Integer(55));
        assert_eq!(table.1[0][2], Cell::Decimal(28.0));
        // receiver 1 totals 5 across its five claims and falls below the cutoff
        assert_eq!(table.1[49][0], Cell::Integer(6));
    }

    #[test]
    fn meal_types_count_claims_on_known_listings() {
        assert_eq!(
            rendered(&claims_by_meal_type(&dataset())),
            strings(&[
                &["Lunch", "3", "27"],
                &["Breakfast", "2", "40"],
                &["Dinner", "1", "5"],
            ])
        );
    }

    #[test]
    fn donations_skip_unregistered_providers() {
        assert_eq!(
            rendered(&donations_per_provider(&dataset())),
            strings(&[
                &["2", "Beta Bakery", "Shelbyville", "20"],
                &["1", "Alpha Foods", "Springfield", "18"],
                &["3", "Gamma Grocers", "Springfield", "5"],
            ])
        );

        let bulk = donations_per_provider(&bulk_dataset());
        assert_eq!(bulk.1.len(), TOP_DONORS);
        assert_eq!(bulk.1[0][3], Cell::Integer(56));
        assert_eq!(bulk.1[49][0], Cell::Integer(6));
    }

    #[test]
    fn expired_listings_run_oldest_first() {
        assert_eq!(
            rendered(&expired_listings(&dataset(), today())),
            strings(&[
                &["1", "Item 1", "10", "2025-05-30", "Alpha Foods", "Springfield"],
                &["4", "Item 4", "7", "2025-05-31", "", "Ogden"],
            ])
        );
    }

    #[test]
    fn expiring_soon_uses_the_signed_difference() {
        // listing 1 is two days past, which is not two days left
        let table = expiring_soon(&dataset(), today());
        assert_eq!(ids(&table), vec![2, 3]);
        assert_eq!(table.1[1][6], Cell::Integer(3));
    }
}
