//! Weekly Diet Log
//!
//! Each week is a record of seven days of meals, weight and mood, kept in a
//! JSON file or a spreadsheet.

pub mod domain;
pub use domain::{
    Config, DayEntry, IndexOutOfRange, Rating, Record, RecordId, Repository, WeekLabel, Weekday,
};

/// Persistence of the full record collection.
pub mod storage;
pub use storage::{JsonFileStore, MemoryStore, SheetStore, Store, StoreError};

/// The form controller binding one record for editing.
pub mod form;
pub use form::{Form, FormError};
