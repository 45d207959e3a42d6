//! Surplus food exchange: typed tables, the expiry view, the filter cascade,
//! CSV import, record editing and the report catalog.

pub mod cascade;
pub mod domain;
pub mod expiry;
pub mod import;
pub mod report;
pub mod repository;

pub use cascade::{apply, AnnotatedListing, CascadeOutcome, FilterPredicates};
pub use domain::{
    Claim, ClaimId, ClaimStatus, ContactChannel, Dataset, FoodId, FoodListing, Provider,
    ProviderId, Receiver, ReceiverId, RecordId,
};
pub use expiry::{normalize, DayWindow, ExpiryStatus};
pub use import::{DatasetImportError, DatasetImporter, ImportSummary, ImportedDataset};
pub use repository::{DatasetRepository, InMemoryDatasetRepository, RepositoryError, TableRecord};
