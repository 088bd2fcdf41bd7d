//! The in-memory collection of weeks for a session.
//!
//! The [`Repository`] holds no persistence responsibility of its own. Every
//! mutation has to be followed by a store save to become durable.

use crate::domain::{Record, RecordId};

/// An index that does not refer to a record in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("index {index} is out of range for {len} record(s)")]
pub struct IndexOutOfRange {
    /// The index that was requested.
    pub index: usize,
    /// The number of records at the time.
    pub len: usize,
}

/// Ordered collection of records, most recent first.
///
/// No two records in the repository share an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    records: Vec<Record>,
}

impl Repository {
    /// Creates an empty repository.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Builds a repository from records in display order.
    ///
    /// If an id appears more than once, the first record with that id is kept
    /// and later ones are dropped.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut repository = Self::new();
        for record in records {
            if repository.position(record.id()).is_some() {
                tracing::warn!("Dropping record with duplicate id {}", record.id());
                continue;
            }
            repository.records.push(record);
        }
        repository
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records in display order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterates over the records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Returns the record at the given position.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if there is no record at `index`.
    pub fn get(&self, index: usize) -> Result<&Record, IndexOutOfRange> {
        self.records.get(index).ok_or(IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Finds the position of the record with the given id.
    #[must_use]
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Finds the record with the given id.
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Inserts or replaces a record, keyed by id.
    ///
    /// An existing record with the same id is replaced where it stands. A new
    /// record goes to the front. Returns the record's position.
    pub fn upsert(&mut self, record: Record) -> usize {
        if let Some(index) = self.position(record.id()) {
            tracing::debug!("Replacing record {} at position {index}", record.id());
            self.records[index] = record;
            index
        } else {
            tracing::debug!("Inserting record {}", record.id());
            self.records.insert(0, record);
            0
        }
    }

    /// Removes and returns the record at the given position.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if there is no record at `index`. The
    /// repository is left unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Record, IndexOutOfRange> {
        if index >= self.records.len() {
            return Err(IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Copies a record into a new week at the front of the repository.
    ///
    /// See [`Record::duplicate`] for what is carried over.
    pub fn duplicate(&mut self, record: &Record, title: impl Into<String>) -> &Record {
        let copy = record.duplicate(title);
        tracing::debug!("Duplicated record {} as {}", record.id(), copy.id());
        self.records.insert(0, copy);
        &self.records[0]
    }
}

impl IntoIterator for Repository {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Repository {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rating, Weekday};

    fn repository_of(titles: &[&str]) -> Repository {
        Repository::from_records(titles.iter().map(|title| Record::blank(*title)))
    }

    fn titles(repository: &Repository) -> Vec<&str> {
        repository.iter().map(|record| record.title.as_str()).collect()
    }

    #[test]
    fn upsert_new_record_goes_to_front() {
        let mut repository = repository_of(&["older"]);
        let index = repository.upsert(Record::blank("newer"));

        assert_eq!(index, 0);
        assert_eq!(titles(&repository), ["newer", "older"]);
    }

    #[test]
    fn upsert_existing_record_keeps_position() {
        let mut repository = repository_of(&["a", "b", "c"]);
        let mut record = repository.get(1).unwrap().clone();
        record.goal = "sleep more".to_string();

        let index = repository.upsert(record.clone());

        assert_eq!(index, 1);
        assert_eq!(titles(&repository), ["a", "b", "c"]);
        assert_eq!(repository.get(1).unwrap(), &record);
    }

    #[test]
    fn upsert_twice_keeps_one_copy_equal_to_second() {
        let mut repository = Repository::new();
        let mut record = Record::blank("week");
        repository.upsert(record.clone());

        record.title = "renamed".to_string();
        repository.upsert(record.clone());

        assert_eq!(repository.len(), 1);
        assert_eq!(repository.find(record.id()), Some(&record));
    }

    #[test]
    fn remove_returns_the_record() {
        let mut repository = repository_of(&["a", "b", "c"]);
        let removed = repository.remove(1).unwrap();

        assert_eq!(removed.title, "b");
        assert_eq!(titles(&repository), ["a", "c"]);
    }

    #[test]
    fn remove_out_of_range_leaves_repository_unchanged() {
        let mut repository = repository_of(&["a", "b"]);
        let before = repository.clone();

        assert_eq!(
            repository.remove(2).unwrap_err(),
            IndexOutOfRange { index: 2, len: 2 }
        );
        assert!(repository.remove(17).is_err());
        assert_eq!(repository, before);
    }

    #[test]
    fn remove_from_empty_repository_fails() {
        let mut repository = Repository::new();
        assert_eq!(
            repository.remove(0).unwrap_err(),
            IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn duplicate_inserts_copy_at_front() {
        let mut repository = Repository::new();
        let mut original = Record::blank("original");
        original.goal = "walk daily".to_string();
        original.day_mut(Weekday::Tue).weight = "70".to_string();
        original.day_mut(Weekday::Tue).lunch = "bibimbap".to_string();
        original.day_mut(Weekday::Tue).rating = Some(Rating::Tough);
        repository.upsert(original.clone());

        let copy = repository.duplicate(&original, "copy").clone();

        assert_eq!(titles(&repository), ["copy", "original"]);
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.goal, "walk daily");
        assert_eq!(copy.day(Weekday::Tue).lunch, "bibimbap");
        assert_eq!(copy.day(Weekday::Tue).weight, "");
        assert_eq!(copy.day(Weekday::Tue).rating, None);
    }

    #[test]
    fn from_records_drops_duplicate_ids() {
        let first = Record::blank("first");
        let mut clash = first.clone();
        clash.title = "clash".to_string();

        let repository = Repository::from_records([first.clone(), clash, Record::blank("other")]);

        assert_eq!(titles(&repository), ["first", "other"]);
        assert_eq!(repository.find(first.id()), Some(&first));
    }
}
