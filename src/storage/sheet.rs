//! A spreadsheet used as a simple document store.
//!
//! Each record is serialized to one JSON document and kept in its own row of
//! a single column. The [`RowStore`] trait abstracts the spreadsheet itself so
//! the row handling does not depend on any particular remote API.

mod google;

pub use google::{CREDENTIALS_ENV, GoogleSheet};

use crate::{
    Record,
    storage::{Store, StoreError, schema},
};

/// A single column of text cells.
pub trait RowStore {
    /// Reads every non-empty row, top to bottom.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be fetched.
    fn read_rows(&self) -> Result<Vec<String>, StoreError>;

    /// Replaces the whole column with the given rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written.
    fn replace_rows(&mut self, rows: &[String]) -> Result<(), StoreError>;
}

impl RowStore for Vec<String> {
    fn read_rows(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.clone())
    }

    fn replace_rows(&mut self, rows: &[String]) -> Result<(), StoreError> {
        *self = rows.to_vec();
        Ok(())
    }
}

/// Stores one serialized record per row.
#[derive(Debug, Clone, Default)]
pub struct SheetStore<R> {
    rows: R,
}

impl<R: RowStore> SheetStore<R> {
    /// Creates a store over the given rows.
    pub const fn new(rows: R) -> Self {
        Self { rows }
    }

    /// The underlying rows.
    pub const fn rows(&self) -> &R {
        &self.rows
    }
}

impl<R: RowStore> Store for SheetStore<R> {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        let rows = self.rows.read_rows()?;
        let total = rows.len();

        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.trim().is_empty())
            .filter_map(|(i, row)| match schema::from_str(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable row {}: {e:?}", i + 1);
                    None
                }
            })
            .collect();

        tracing::debug!("Loaded {} of {total} rows", records.len());
        Ok(records)
    }

    fn save(&mut self, records: &[Record]) -> Result<(), StoreError> {
        let rows = records
            .iter()
            .map(schema::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        self.rows.replace_rows(&rows)?;
        tracing::info!("Saved {} records to spreadsheet", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rating, Weekday};

    /// Rows that refuse every write.
    struct ReadOnlyRows(Vec<String>);

    impl RowStore for ReadOnlyRows {
        fn read_rows(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.0.clone())
        }

        fn replace_rows(&mut self, _rows: &[String]) -> Result<(), StoreError> {
            Err(StoreError::Rejected("sheet is protected".to_string()))
        }
    }

    fn week(title: &str) -> Record {
        let mut record = Record::blank(title);
        record.day_mut(Weekday::Sat).dinner = "samgyeopsal".to_string();
        record.day_mut(Weekday::Sat).rating = Some(Rating::Tough);
        record
    }

    #[test]
    fn one_row_per_record() {
        let mut store = SheetStore::new(Vec::new());
        store.save(&[week("a"), week("b")]).unwrap();

        assert_eq!(store.rows().len(), 2);
        assert!(store.rows().iter().all(|row| !row.contains('\n')));
    }

    #[test]
    fn rows_round_trip() {
        let mut store = SheetStore::new(Vec::new());
        let records = vec![week("a"), week("b")];
        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn empty_sheet_loads_empty() {
        let store = SheetStore::new(Vec::<String>::new());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_and_blank_rows_are_skipped() {
        let good = week("good");
        let rows = vec![
            "{\"id\": ".to_string(),
            String::new(),
            schema::to_string(&good).unwrap(),
            "hello".to_string(),
        ];
        let store = SheetStore::new(rows);

        assert_eq!(store.load().unwrap(), vec![good]);
    }

    #[test]
    fn rejected_write_is_reported() {
        let mut store = SheetStore::new(ReadOnlyRows(Vec::new()));
        assert!(matches!(
            store.save(&[week("a")]),
            Err(StoreError::Rejected(_))
        ));
    }
}
