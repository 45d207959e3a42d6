use super::normalizer::{
    clean_optional, clean_text, parse_date, parse_datetime, parse_id, parse_quantity,
};
use crate::exchange::domain::{
    Claim, ClaimId, ClaimStatus, FoodId, FoodListing, Provider, ProviderId, Receiver, ReceiverId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

/// One CSV export table and the typed record each row becomes.
pub(crate) trait ExportRow: DeserializeOwned {
    type Record;
    const TABLE: &'static str;

    /// `None` when the row has no usable primary key.
    fn into_record(self) -> Option<Self::Record>;
}

#[derive(Debug)]
pub(crate) struct ParsedTable<T> {
    pub(crate) records: Vec<T>,
    pub(crate) skipped: usize,
}

/// Malformed rows are dropped with a warning; only I/O failures abort.
pub(crate) fn parse_table<R: Read, T: ExportRow>(
    reader: R,
) -> Result<ParsedTable<T::Record>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, row) in csv_reader.deserialize::<T>().enumerate() {
        // header is line 1
        let line = index + 2;
        match row {
            Ok(row) => match row.into_record() {
                Some(record) => records.push(record),
                None => {
                    warn!(table = T::TABLE, line, "skipping row without a valid id");
                    skipped += 1;
                }
            },
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                warn!(table = T::TABLE, line, error = %err, "skipping malformed row");
                skipped += 1;
            }
        }
    }

    Ok(ParsedTable { records, skipped })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProviderRow {
    #[serde(rename = "Provider_ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
    #[serde(rename = "Address", default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(rename = "Contact", default, deserialize_with = "empty_string_as_none")]
    contact: Option<String>,
}

impl ExportRow for ProviderRow {
    type Record = Provider;
    const TABLE: &'static str = "Providers";

    fn into_record(self) -> Option<Provider> {
        let id = parse_id(self.id.as_deref()?)?;
        Some(Provider {
            id: ProviderId(id),
            name: clean_optional(self.name),
            kind: clean_optional(self.kind),
            address: self.address.as_deref().map(clean_text),
            city: clean_optional(self.city),
            contact: clean_optional(self.contact),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReceiverRow {
    #[serde(rename = "Receiver_ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "empty_string_as_none")]
    kind: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(rename = "Contact", default, deserialize_with = "empty_string_as_none")]
    contact: Option<String>,
}

impl ExportRow for ReceiverRow {
    type Record = Receiver;
    const TABLE: &'static str = "Receivers";

    fn into_record(self) -> Option<Receiver> {
        let id = parse_id(self.id.as_deref()?)?;
        Some(Receiver {
            id: ReceiverId(id),
            name: clean_optional(self.name),
            kind: clean_optional(self.kind),
            city: clean_optional(self.city),
            contact: clean_optional(self.contact),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingRow {
    #[serde(rename = "Food_ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Food_Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Quantity", default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
    #[serde(rename = "Expiry_Date", default, deserialize_with = "empty_string_as_none")]
    expiry_date: Option<String>,
    #[serde(rename = "Provider_ID", default, deserialize_with = "empty_string_as_none")]
    provider_id: Option<String>,
    #[serde(rename = "Provider_Type", default, deserialize_with = "empty_string_as_none")]
    provider_type: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(rename = "Food_Type", default, deserialize_with = "empty_string_as_none")]
    food_type: Option<String>,
    #[serde(rename = "Meal_Type", default, deserialize_with = "empty_string_as_none")]
    meal_type: Option<String>,
}

impl ExportRow for ListingRow {
    type Record = FoodListing;
    const TABLE: &'static str = "Food_Listings";

    fn into_record(self) -> Option<FoodListing> {
        let id = parse_id(self.id.as_deref()?)?;
        // An unresolvable provider reference becomes id 0, which never matches a provider.
        let provider_id = self.provider_id.as_deref().and_then(parse_id).unwrap_or(0);
        Some(FoodListing {
            id: FoodId(id),
            name: clean_optional(self.name),
            quantity: self.quantity.as_deref().map(parse_quantity).unwrap_or(0),
            expiry_date: self.expiry_date.as_deref().and_then(parse_date),
            provider_id: ProviderId(provider_id),
            provider_type: clean_optional(self.provider_type),
            location: clean_optional(self.location),
            food_type: clean_optional(self.food_type),
            meal_type: clean_optional(self.meal_type),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimRow {
    #[serde(rename = "Claim_ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Food_ID", default, deserialize_with = "empty_string_as_none")]
    food_id: Option<String>,
    #[serde(rename = "Receiver_ID", default, deserialize_with = "empty_string_as_none")]
    receiver_id: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Timestamp", default, deserialize_with = "empty_string_as_none")]
    timestamp: Option<String>,
}

impl ExportRow for ClaimRow {
    type Record = Claim;
    const TABLE: &'static str = "Claims";

    fn into_record(self) -> Option<Claim> {
        let id = parse_id(self.id.as_deref()?)?;
        Some(Claim {
            id: ClaimId(id),
            food_id: FoodId(self.food_id.as_deref().and_then(parse_id).unwrap_or(0)),
            receiver_id: ReceiverId(self.receiver_id.as_deref().and_then(parse_id).unwrap_or(0)),
            status: ClaimStatus::from_label(self.status.as_deref().unwrap_or("Pending")),
            timestamp: self.timestamp.as_deref().and_then(parse_datetime),
        })
    }
}
