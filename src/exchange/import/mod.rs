mod normalizer;
mod parser;

use super::domain::Dataset;
use crate::config::DataConfig;
use parser::{ClaimRow, ExportRow, ListingRow, ProviderRow, ReceiverRow};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub enum DatasetImportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { table: &'static str, source: csv::Error },
}

impl DatasetImportError {
    /// True when the export file itself does not exist.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            DatasetImportError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

impl std::fmt::Display for DatasetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetImportError::Io { path, source } => {
                write!(f, "failed to read export {}: {}", path.display(), source)
            }
            DatasetImportError::Csv { table, source } => {
                write!(f, "invalid {} CSV data: {}", table, source)
            }
        }
    }
}

impl std::error::Error for DatasetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetImportError::Io { source, .. } => Some(source),
            DatasetImportError::Csv { source, .. } => Some(source),
        }
    }
}

/// Per-table row counts from one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub providers: usize,
    pub receivers: usize,
    pub listings: usize,
    pub claims: usize,
    pub skipped_rows: usize,
}

#[derive(Debug)]
pub struct ImportedDataset {
    pub dataset: Dataset,
    pub summary: ImportSummary,
}

pub struct DatasetImporter;

impl DatasetImporter {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<ImportedDataset, DatasetImportError> {
        Self::from_config(&DataConfig::with_dir(dir))
    }

    pub fn from_config(config: &DataConfig) -> Result<ImportedDataset, DatasetImportError> {
        let providers = open(config.providers_path())?;
        let receivers = open(config.receivers_path())?;
        let listings = open(config.listings_path())?;
        let claims = open(config.claims_path())?;

        let imported = Self::from_readers(providers, receivers, listings, claims)?;
        info!(
            data_dir = %config.data_dir.display(),
            providers = imported.summary.providers,
            receivers = imported.summary.receivers,
            listings = imported.summary.listings,
            claims = imported.summary.claims,
            skipped = imported.summary.skipped_rows,
            "exchange dataset imported"
        );
        Ok(imported)
    }

    pub fn from_readers<P: Read, R: Read, L: Read, C: Read>(
        providers: P,
        receivers: R,
        listings: L,
        claims: C,
    ) -> Result<ImportedDataset, DatasetImportError> {
        let providers = table::<_, ProviderRow>(providers)?;
        let receivers = table::<_, ReceiverRow>(receivers)?;
        let listings = table::<_, ListingRow>(listings)?;
        let claims = table::<_, ClaimRow>(claims)?;

        let summary = ImportSummary {
            providers: providers.records.len(),
            receivers: receivers.records.len(),
            listings: listings.records.len(),
            claims: claims.records.len(),
            skipped_rows: providers.skipped + receivers.skipped + listings.skipped + claims.skipped,
        };

        Ok(ImportedDataset {
            dataset: Dataset {
                providers: providers.records,
                receivers: receivers.records,
                listings: listings.records,
                claims: claims.records,
            },
            summary,
        })
    }
}

fn open(path: PathBuf) -> Result<File, DatasetImportError> {
    File::open(&path).map_err(|source| DatasetImportError::Io { path, source })
}

fn table<R: Read, T: ExportRow>(
    reader: R,
) -> Result<parser::ParsedTable<T::Record>, DatasetImportError> {
    parser::parse_table::<R, T>(reader).map_err(|source| DatasetImportError::Csv {
        table: T::TABLE,
        source,
    })
}
