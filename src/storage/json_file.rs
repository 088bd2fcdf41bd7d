//! A single JSON file holding every week.
//!
//! The whole collection is one JSON array, rewritten in full on every save.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    Record,
    storage::{Store, StoreError, schema},
};

/// Stores the collection as a JSON array in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file need not exist yet.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No data file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim_ascii().is_empty() {
            return Ok(Vec::new());
        }

        // Text that is not valid UTF-8 is a parse error rather than an I/O one.
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&content)?;
        let total = entries.len();

        let records: Vec<Record> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match schema::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable entry {i} in {}: {e:?}",
                        self.path.display()
                    );
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Loaded {} of {total} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    fn save(&mut self, records: &[Record]) -> Result<(), StoreError> {
        let json = schema::collection_to_string_pretty(records)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{Rating, Weekday};

    fn setup_temp_store() -> (TempDir, JsonFileStore) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = tmp.path().join("romi_data.json");
        (tmp, JsonFileStore::new(path))
    }

    fn logged_week(title: &str) -> Record {
        let mut record = Record::blank(title);
        record.goal = "no late snacks".to_string();
        let day = record.day_mut(Weekday::Thu);
        day.weight = "59,8 kg".to_string();
        day.snack = "고구마".to_string();
        day.rating = Some(Rating::Great);
        record
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_tmp, store) = setup_temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn empty_file_loads_empty() {
        let (_tmp, store) = setup_temp_store();
        std::fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn saved_records_load_back_in_order() {
        let (_tmp, mut store) = setup_temp_store();
        let records = vec![logged_week("second"), logged_week("first")];

        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn empty_collection_round_trips() {
        let (_tmp, mut store) = setup_temp_store();
        store.save(&[]).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap().trim(), "[]");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let (_tmp, mut store) = setup_temp_store();
        let kept = logged_week("kept");
        store.save(&[logged_week("removed"), kept.clone()]).unwrap();

        store.save(std::slice::from_ref(&kept)).unwrap();

        assert_eq!(store.load().unwrap(), vec![kept]);
    }

    #[test]
    fn non_ascii_text_is_written_verbatim() {
        let (_tmp, mut store) = setup_temp_store();
        store.save(&[logged_week("week")]).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("고구마"));
    }

    #[test]
    fn corrupt_entries_are_skipped() {
        let (_tmp, mut store) = setup_temp_store();
        let good = logged_week("good");
        store.save(std::slice::from_ref(&good)).unwrap();

        let mut entries: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        entries.insert(0, serde_json::json!({"id": 42}));
        entries.push(serde_json::json!("not a record"));
        std::fs::write(store.path(), serde_json::to_string(&entries).unwrap()).unwrap();

        assert_eq!(store.load().unwrap(), vec![good]);
    }

    #[test]
    fn unreadable_file_is_a_parse_error() {
        let (_tmp, store) = setup_temp_store();
        std::fs::write(store.path(), "{ this is not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let (_tmp, mut store) = setup_temp_store();
        let mut week = logged_week("week");
        week.goal = "GOAL".to_string();
        store.save(&[week]).unwrap();

        let mut bytes = std::fs::read(store.path()).unwrap();
        let at = bytes.windows(4).position(|w| w == b"GOAL").unwrap();
        bytes[at] = 0xB9;
        std::fs::write(store.path(), bytes).unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(tmp.path().join("nested/dir/weeks.json"));

        store.save(&[logged_week("week")]).unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
    }
}
