//! Persistence of the full record collection.
//!
//! A [`Store`] reads and overwrites the whole collection at once. Entries
//! that cannot be parsed are skipped on load rather than failing it.

use std::io;

use crate::Record;

pub mod json_file;
mod memory;
pub mod schema;
pub mod sheet;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use schema::EntryError;
pub use sheet::{GoogleSheet, RowStore, SheetStore};

/// Reads and writes the full collection of weeks to a backing medium.
pub trait Store {
    /// Reconstructs the collection, in display order.
    ///
    /// An absent or empty medium yields an empty collection. Individual
    /// entries that cannot be parsed are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be reached or is unreadable as a
    /// whole.
    fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Overwrites the medium with the given collection.
    ///
    /// The overwrite is not transactional: a failure part way through may
    /// leave the medium partially written.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be reached or rejects the write.
    fn save(&mut self, records: &[Record]) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, records: &[Record]) -> Result<(), StoreError> {
        (**self).save(records)
    }
}

/// Errors raised by a [`Store`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Required settings or credentials are missing.
    #[error("record store is not configured: {0}")]
    NotConfigured(String),

    /// The medium could not be reached.
    #[error("record store is unreachable: {0}")]
    Unreachable(String),

    /// The medium's contents are not a collection of records.
    #[error("record store contents could not be parsed")]
    Parse(#[from] serde_json::Error),

    /// The medium refused the write.
    #[error("record store rejected the write: {0}")]
    Rejected(String),

    /// An I/O error occurred.
    #[error("failed to access record store")]
    Io(#[from] io::Error),
}
