use chrono::{Local, NaiveDate};
use food_share::config::DataConfig;
use food_share::error::AppError;
use food_share::exchange::{Dataset, DatasetImporter};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Import the four exports; a missing data directory yields an empty
/// exchange so the service can still start and accept edits.
pub(crate) fn load_dataset(config: &DataConfig) -> Result<Dataset, AppError> {
    match DatasetImporter::from_config(config) {
        Ok(imported) => Ok(imported.dataset),
        Err(err) if err.is_missing_file() => {
            warn!(
                data_dir = %config.data_dir.display(),
                error = %err,
                "exchange exports not found; starting with an empty dataset"
            );
            Ok(Dataset::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Every entry point takes an optional evaluation date; only here is the clock read.
pub(crate) fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
