use super::domain::{
    Claim, ClaimId, Dataset, FoodId, FoodListing, Provider, ProviderId, Receiver, ReceiverId,
    RecordId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Typed access to one of the four exchange tables.
pub trait TableRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: RecordId;
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
    fn rows(dataset: &Dataset) -> &Vec<Self>;
    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self>;
}

impl TableRecord for Provider {
    type Id = ProviderId;
    const TABLE: &'static str = "providers";

    fn id(&self) -> ProviderId {
        self.id
    }

    fn set_id(&mut self, id: ProviderId) {
        self.id = id;
    }

    fn rows(dataset: &Dataset) -> &Vec<Self> {
        &dataset.providers
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.providers
    }
}

impl TableRecord for Receiver {
    type Id = ReceiverId;
    const TABLE: &'static str = "receivers";

    fn id(&self) -> ReceiverId {
        self.id
    }

    fn set_id(&mut self, id: ReceiverId) {
        self.id = id;
    }

    fn rows(dataset: &Dataset) -> &Vec<Self> {
        &dataset.receivers
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.receivers
    }
}

impl TableRecord for FoodListing {
    type Id = FoodId;
    const TABLE: &'static str = "listings";

    fn id(&self) -> FoodId {
        self.id
    }

    fn set_id(&mut self, id: FoodId) {
        self.id = id;
    }

    fn rows(dataset: &Dataset) -> &Vec<Self> {
        &dataset.listings
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.listings
    }
}

impl TableRecord for Claim {
    type Id = ClaimId;
    const TABLE: &'static str = "claims";

    fn id(&self) -> ClaimId {
        self.id
    }

    fn set_id(&mut self, id: ClaimId) {
        self.id = id;
    }

    fn rows(dataset: &Dataset) -> &Vec<Self> {
        &dataset.claims
    }

    fn rows_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.claims
    }
}

/// Storage abstraction for reading snapshots and editing rows.
///
/// Edits never cascade: deleting a listing leaves its claims dangling, and
/// the filter cascade drops them on the next run.
pub trait DatasetRepository: Send + Sync {
    fn snapshot(&self) -> Result<Dataset, RepositoryError>;
    fn replace(&self, dataset: Dataset) -> Result<(), RepositoryError>;
    /// A zero id asks the repository to assign the next free one.
    fn insert<T: TableRecord>(&self, record: T) -> Result<T, RepositoryError>;
    fn update<T: TableRecord>(&self, record: T) -> Result<T, RepositoryError>;
    fn delete<T: TableRecord>(&self, id: T::Id) -> Result<T, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{table} record {id} already exists")]
    Conflict { table: &'static str, id: String },
    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    fn conflict<T: TableRecord>(id: T::Id) -> Self {
        Self::Conflict {
            table: T::TABLE,
            id: id.to_string(),
        }
    }

    fn not_found<T: TableRecord>(id: T::Id) -> Self {
        Self::NotFound {
            table: T::TABLE,
            id: id.to_string(),
        }
    }
}

/// Process-local store shared between request handlers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDatasetRepository {
    dataset: Arc<RwLock<Dataset>>,
}

impl InMemoryDatasetRepository {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(dataset)),
        }
    }

    fn read<F, O>(&self, f: F) -> Result<O, RepositoryError>
    where
        F: FnOnce(&Dataset) -> O,
    {
        let guard = self
            .dataset
            .read()
            .map_err(|_| RepositoryError::Unavailable("dataset lock poisoned".to_string()))?;
        Ok(f(&guard))
    }

    fn write<F, O>(&self, f: F) -> Result<O, RepositoryError>
    where
        F: FnOnce(&mut Dataset) -> Result<O, RepositoryError>,
    {
        let mut guard = self
            .dataset
            .write()
            .map_err(|_| RepositoryError::Unavailable("dataset lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

fn next_id<T: TableRecord>(rows: &[T]) -> T::Id {
    let max = rows.iter().map(|row| row.id().get()).max().unwrap_or(0);
    T::Id::new(max.saturating_add(1))
}

impl DatasetRepository for InMemoryDatasetRepository {
    fn snapshot(&self) -> Result<Dataset, RepositoryError> {
        self.read(Dataset::clone)
    }

    fn replace(&self, dataset: Dataset) -> Result<(), RepositoryError> {
        self.write(|current| {
            *current = dataset;
            Ok(())
        })
    }

    fn insert<T: TableRecord>(&self, mut record: T) -> Result<T, RepositoryError> {
        self.write(|dataset| {
            let rows = T::rows_mut(dataset);
            if record.id().get() == 0 {
                record.set_id(next_id(rows));
            } else if rows.iter().any(|row| row.id() == record.id()) {
                return Err(RepositoryError::conflict::<T>(record.id()));
            }

            rows.push(record.clone());
            info!(table = T::TABLE, id = %record.id(), "record inserted");
            Ok(record)
        })
    }

    fn update<T: TableRecord>(&self, record: T) -> Result<T, RepositoryError> {
        self.write(|dataset| {
            let slot = T::rows_mut(dataset)
                .iter_mut()
                .find(|row| row.id() == record.id())
                .ok_or_else(|| RepositoryError::not_found::<T>(record.id()))?;
            *slot = record.clone();
            info!(table = T::TABLE, id = %record.id(), "record updated");
            Ok(record)
        })
    }

    fn delete<T: TableRecord>(&self, id: T::Id) -> Result<T, RepositoryError> {
        self.write(|dataset| {
            let rows = T::rows_mut(dataset);
            let position = rows
                .iter()
                .position(|row| row.id() == id)
                .ok_or_else(|| RepositoryError::not_found::<T>(id))?;
            let removed = rows.remove(position);
            info!(table = T::TABLE, %id, "record deleted");
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::domain::ClaimStatus;
    use crate::exchange::FilterPredicates;
    use chrono::NaiveDate;

    fn receiver(id: u32, name: &str) -> Receiver {
        Receiver {
            id: ReceiverId(id),
            name: name.to_string(),
            kind: "Shelter".to_string(),
            city: "Springfield".to_string(),
            contact: "555-0100".to_string(),
        }
    }

    #[test]
    fn insert_assigns_next_id_when_zero() {
        let repository = InMemoryDatasetRepository::default();
        repository.insert(receiver(4, "North Shelter")).expect("insert");
        let inserted = repository.insert(receiver(0, "South Shelter")).expect("insert");
        assert_eq!(inserted.id, ReceiverId(5));
        assert_eq!(repository.snapshot().expect("snapshot").receivers.len(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let repository = InMemoryDatasetRepository::default();
        repository.insert(receiver(1, "North Shelter")).expect("insert");
        let error = repository
            .insert(receiver(1, "Duplicate"))
            .expect_err("duplicate id");
        assert!(matches!(error, RepositoryError::Conflict { table: "receivers", .. }));
    }

    #[test]
    fn update_and_delete_require_existing_rows() {
        let repository = InMemoryDatasetRepository::default();
        let error = repository
            .update(receiver(9, "Missing"))
            .expect_err("row missing");
        assert_eq!(error.to_string(), "receivers record receiver#9 not found");

        repository.insert(receiver(9, "Original")).expect("insert");
        let updated = repository.update(receiver(9, "Renamed")).expect("update");
        assert_eq!(updated.name, "Renamed");

        let removed = repository.delete::<Receiver>(ReceiverId(9)).expect("delete");
        assert_eq!(removed.name, "Renamed");
        assert!(repository.delete::<Receiver>(ReceiverId(9)).is_err());
    }

    #[test]
    fn deleting_a_listing_leaves_claims_for_the_cascade_to_drop() {
        let listing = FoodListing {
            id: FoodId(1),
            name: "Rice".to_string(),
            quantity: 4,
            expiry_date: None,
            provider_id: ProviderId(1),
            provider_type: String::new(),
            location: "Springfield".to_string(),
            food_type: "Vegan".to_string(),
            meal_type: "Lunch".to_string(),
        };
        let claim = Claim {
            id: ClaimId(1),
            food_id: FoodId(1),
            receiver_id: ReceiverId(1),
            status: ClaimStatus::Pending,
            timestamp: None,
        };
        let repository = InMemoryDatasetRepository::new(Dataset {
            listings: vec![listing],
            claims: vec![claim],
            ..Dataset::default()
        });

        repository.delete::<FoodListing>(FoodId(1)).expect("delete");
        let snapshot = repository.snapshot().expect("snapshot");
        assert_eq!(snapshot.claims.len(), 1);

        let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        let outcome = snapshot.filter(&FilterPredicates::new(), today);
        assert!(outcome.claims.is_empty());
    }
}
