mod catalog;
mod dashboard;
mod export;
mod insights;
mod queries;
pub mod views;

pub use catalog::{run_report, ReportError, ReportKind};
pub use dashboard::{contact_directory, dashboard, status_breakdown, top_providers};
pub use insights::{
    donations_analysis, provider_insights, receiver_insights, wastage, UNKNOWN_MONTH,
};
pub use views::{
    CatalogEntry, Cell, CityClaims, CityProviders, ContactEntry, DashboardSummary,
    DonationsAnalysis, ExpiryBucket, FilterOptions, KpiSummary, LabelQuantity, ProviderDonation,
    ProviderInsights, QuantityShare, ReceiverInsights, ReportTable, StatusShare, WastageReport,
};
