use food_share::exchange::report::{CatalogEntry, Cell, DashboardSummary, ReportTable};
use food_share::exchange::{AnnotatedListing, CascadeOutcome, Dataset, ExpiryStatus};
use chrono::NaiveDate;
use std::fmt::Write;

/// Human-readable expiry column: `"3 days left"`, `"expired 2 days ago"`, `"unknown"`.
pub(crate) fn describe_expiry(status: &ExpiryStatus) -> String {
    match status.days_to_expiry {
        None => "unknown".to_string(),
        Some(0) => "expires today".to_string(),
        Some(days) if status.is_expired => format!("expired {days} {} ago", plural(days)),
        Some(days) => format!("{days} {} left", plural(days)),
    }
}

fn plural(days: u32) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

pub(crate) fn render_table(table: &ReportTable) -> String {
    let header: Vec<String> = table.columns.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(Cell::to_string).collect())
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{}", table.title);
    if rows.is_empty() {
        out.push_str("  (no rows)\n");
        return out;
    }
    out.push_str(&align(&header, &rows));
    out
}

pub(crate) fn render_catalog(entries: &[CatalogEntry]) -> String {
    let mut out = String::from("Available reports\n");
    for (position, entry) in entries.iter().enumerate() {
        let suffix = if entry.requires_city {
            " (requires --city)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  q{:<3}{:<32}{}{}",
            position + 1,
            entry.slug,
            entry.title,
            suffix
        );
    }
    out
}

pub(crate) fn render_outcome(
    dataset: &Dataset,
    outcome: &CascadeOutcome,
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Filtered listings as of {today}: {} listings ({} units), {} claims",
        outcome.listings.len(),
        outcome.total_quantity(),
        outcome.claims.len()
    );
    out.push_str(&render_listings(dataset, &outcome.annotated(today)));

    if !outcome.claims.is_empty() {
        out.push_str("\nClaims\n");
        let header = ["Claim_ID", "Food_ID", "Receiver", "Status", "Timestamp"]
            .map(String::from)
            .to_vec();
        let rows: Vec<Vec<String>> = outcome
            .claims
            .iter()
            .map(|claim| {
                vec![
                    claim.id.0.to_string(),
                    claim.food_id.0.to_string(),
                    dataset
                        .receiver(claim.receiver_id)
                        .map_or_else(|| claim.receiver_id.to_string(), |r| r.name.clone()),
                    claim.status.to_string(),
                    claim
                        .timestamp
                        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        out.push_str(&align(&header, &rows));
    }
    out
}

pub(crate) fn render_dashboard(dataset: &Dataset, summary: &DashboardSummary) -> String {
    let kpis = &summary.kpis;
    let mut out = String::new();
    let _ = writeln!(out, "Food exchange dashboard ({})", summary.today);
    let _ = writeln!(
        out,
        "  Providers: {}  Receivers: {}  Claims: {}",
        kpis.providers, kpis.receivers, kpis.claims
    );
    let _ = writeln!(
        out,
        "  Matching listings: {} ({} units)  Matching claims: {}",
        kpis.matching_listings, kpis.total_quantity, kpis.matching_claims
    );

    out.push_str("\nTop providers by donated quantity\n");
    if summary.top_providers.is_empty() {
        out.push_str("  none\n");
    }
    for donation in &summary.top_providers {
        let _ = writeln!(
            out,
            "  {:<32}{:>8}",
            donation.provider_name, donation.total_donated
        );
    }

    out.push_str("\nClaim status\n");
    if summary.status_breakdown.is_empty() {
        out.push_str("  none\n");
    }
    for share in &summary.status_breakdown {
        let _ = writeln!(
            out,
            "  {:<16}{:>6}{:>9.2}%",
            share.status, share.count, share.percentage
        );
    }

    out.push('\n');
    out.push_str(&render_listings(dataset, &summary.listings));
    out
}

fn render_listings(dataset: &Dataset, listings: &[AnnotatedListing]) -> String {
    if listings.is_empty() {
        return "  no listings match\n".to_string();
    }

    let header = [
        "Food_ID", "Food_Name", "Qty", "Provider", "Location", "Food_Type", "Meal_Type", "Expiry",
    ]
    .map(String::from)
    .to_vec();
    let rows: Vec<Vec<String>> = listings
        .iter()
        .map(|entry| {
            let listing = &entry.listing;
            vec![
                listing.id.0.to_string(),
                listing.name.clone(),
                listing.quantity.to_string(),
                dataset
                    .provider(listing.provider_id)
                    .map_or_else(String::new, |p| p.name.clone()),
                listing.location.clone(),
                listing.food_type.clone(),
                listing.meal_type.clone(),
                describe_expiry(&entry.expiry),
            ]
        })
        .collect();
    align(&header, &rows)
}

fn align(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let mut line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "  {}", padded.join("  ").trim_end());
    };
    line(header);
    for row in rows {
        line(row);
    }
    out
}
