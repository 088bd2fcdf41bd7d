use crate::{
    Record,
    storage::{Store, StoreError, schema},
};

/// A store that keeps the serialized collection in memory.
///
/// Records pass through the same serialization as the persistent stores, so
/// what is loaded back is exactly what a file would have yielded.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<String>,
    saves: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
            saves: 0,
        }
    }

    /// Creates a store that already holds the given raw documents.
    #[must_use]
    pub const fn with_documents(documents: Vec<String>) -> Self {
        Self {
            documents,
            saves: 0,
        }
    }

    /// The raw serialized documents, one per record.
    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// How many times the collection has been saved.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .documents
            .iter()
            .filter_map(|document| {
                schema::from_str(document)
                    .inspect_err(|e| tracing::warn!("Skipping unreadable record: {e:?}"))
                    .ok()
            })
            .collect())
    }

    fn save(&mut self, records: &[Record]) -> Result<(), StoreError> {
        self.documents = records
            .iter()
            .map(schema::to_string)
            .collect::<Result<_, _>>()?;
        self.saves += 1;
        Ok(())
    }
}
