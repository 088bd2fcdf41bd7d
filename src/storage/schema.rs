//! The serialized form of a week record.
//!
//! Records are written as:
//!
//! ```json
//! {
//!   "id": "…",
//!   "title": "Week of Jan 1",
//!   "goal": "",
//!   "days": {
//!     "Mon": { "weight": "", "breakfast": "", "lunch": "", "snack": "", "dinner": "", "rating": null },
//!     …
//!   }
//! }
//! ```
//!
//! Entries written by the earlier form (`content` holding `bf`/`lc`/`sn`/`dn`
//! slots and an emoji `eval`) are still read, and are rewritten in the
//! current shape on the next save.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DayEntry, Rating, Record, RecordId, Weekday, domain::Days};

/// Why a single stored entry could not be turned into a [`Record`].
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The entry does not have the shape of a record.
    #[error("entry is not a week record")]
    Json(#[from] serde_json::Error),

    /// The entry names a day that is not one of the seven weekday codes.
    #[error("unknown weekday '{0}'")]
    UnknownDay(String),
}

/// Serializes a record as a self-contained JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails, which does not happen for
/// records held in memory.
pub fn to_string(record: &Record) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StoredRecord::from(record))
}

/// Serializes a record as an indented JSON document, for display.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_string_pretty(record: &Record) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StoredRecord::from(record))
}

/// Serializes a collection of records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn collection_to_string_pretty(records: &[Record]) -> Result<String, serde_json::Error> {
    let stored: Vec<StoredRecord> = records.iter().map(StoredRecord::from).collect();
    serde_json::to_string_pretty(&stored)
}

/// Parses one record from a JSON document.
///
/// # Errors
///
/// Returns an error if the document is not a record in either the current or
/// the legacy shape.
pub fn from_str(json: &str) -> Result<Record, EntryError> {
    let any: AnyVersion = serde_json::from_str(json)?;
    any.try_into()
}

/// Parses one record from an already-decoded JSON value.
///
/// # Errors
///
/// Returns an error if the value is not a record in either the current or the
/// legacy shape.
pub fn from_value(value: serde_json::Value) -> Result<Record, EntryError> {
    let any: AnyVersion = serde_json::from_value(value)?;
    any.try_into()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredRecord {
    id: String,
    title: String,
    goal: String,
    days: StoredDays,
}

/// Day entries keyed by weekday code, written Monday first.
#[derive(Debug)]
struct StoredDays(Vec<(String, StoredDay)>);

impl Serialize for StoredDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(day, entry)| (day, entry)))
    }
}

impl<'de> Deserialize<'de> for StoredDays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = BTreeMap::<String, StoredDay>::deserialize(deserializer)?;
        Ok(Self(map.into_iter().collect()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredDay {
    weight: String,
    breakfast: String,
    lunch: String,
    snack: String,
    dinner: String,
    rating: Option<StoredRating>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum StoredRating {
    #[serde(rename = "great", alias = "😍")]
    Great,
    #[serde(rename = "good", alias = "🙂")]
    Good,
    #[serde(rename = "tough", alias = "😅")]
    Tough,
}

/// The shape written by the earlier form.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    goal: String,
    content: BTreeMap<String, LegacyDay>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyDay {
    #[serde(default)]
    weight: String,
    #[serde(default)]
    bf: String,
    #[serde(default)]
    lc: String,
    #[serde(default)]
    sn: String,
    #[serde(default)]
    dn: String,
    #[serde(default)]
    eval: Option<StoredRating>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnyVersion {
    Current(StoredRecord),
    Legacy(LegacyRecord),
}

impl From<StoredRating> for Rating {
    fn from(rating: StoredRating) -> Self {
        match rating {
            StoredRating::Great => Self::Great,
            StoredRating::Good => Self::Good,
            StoredRating::Tough => Self::Tough,
        }
    }
}

impl From<Rating> for StoredRating {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Great => Self::Great,
            Rating::Good => Self::Good,
            Rating::Tough => Self::Tough,
        }
    }
}

impl From<&DayEntry> for StoredDay {
    fn from(entry: &DayEntry) -> Self {
        Self {
            weight: entry.weight.clone(),
            breakfast: entry.breakfast.clone(),
            lunch: entry.lunch.clone(),
            snack: entry.snack.clone(),
            dinner: entry.dinner.clone(),
            rating: entry.rating.map(StoredRating::from),
        }
    }
}

impl From<StoredDay> for DayEntry {
    fn from(day: StoredDay) -> Self {
        Self {
            weight: day.weight,
            breakfast: day.breakfast,
            lunch: day.lunch,
            snack: day.snack,
            dinner: day.dinner,
            rating: day.rating.map(Rating::from),
        }
    }
}

impl From<LegacyDay> for DayEntry {
    fn from(day: LegacyDay) -> Self {
        Self {
            weight: day.weight,
            breakfast: day.bf,
            lunch: day.lc,
            snack: day.sn,
            dinner: day.dn,
            rating: day.eval.map(Rating::from),
        }
    }
}

impl From<&Record> for StoredRecord {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id().to_string(),
            title: record.title.clone(),
            goal: record.goal.clone(),
            days: StoredDays(
                record
                    .days
                    .iter()
                    .map(|(day, entry)| (day.code().to_string(), StoredDay::from(entry)))
                    .collect(),
            ),
        }
    }
}

/// Places stored entries on their weekdays. Days that are missing stay blank.
fn collect_days<E: Into<DayEntry>>(
    entries: impl IntoIterator<Item = (String, E)>,
) -> Result<Days, EntryError> {
    entries
        .into_iter()
        .map(|(code, entry)| {
            let day = Weekday::ALL
                .into_iter()
                .find(|day| day.code() == code)
                .ok_or(EntryError::UnknownDay(code))?;
            let entry: DayEntry = entry.into();
            Ok((day, entry))
        })
        .collect::<Result<Vec<_>, EntryError>>()
        .map(|days| days.into_iter().collect())
}

impl TryFrom<AnyVersion> for Record {
    type Error = EntryError;

    fn try_from(any: AnyVersion) -> Result<Self, Self::Error> {
        match any {
            AnyVersion::Current(StoredRecord {
                id,
                title,
                goal,
                days,
            }) => Ok(Self::from_parts(
                RecordId::from(id),
                title,
                goal,
                collect_days(days.0)?,
            )),
            AnyVersion::Legacy(LegacyRecord {
                id,
                title,
                goal,
                content,
            }) => {
                tracing::debug!("Upgrading legacy record {id}");
                Ok(Self::from_parts(
                    RecordId::from(id),
                    title,
                    goal,
                    collect_days(content)?,
                ))
            }
        }
    }
}
