//! Domain models for the weekly diet log.
//!
//! This module contains the core domain types including week records, the
//! per-day entries, the in-memory repository and configuration.

/// Week record domain model.
pub mod record;
pub use record::{Record, RecordId};

/// Per-day entries, weekday codes and mood ratings.
pub mod day;
pub use day::{DayEntry, Days, Rating, Weekday};

mod label;
pub use label::{InvalidFormat, WeekLabel};

mod repository;
pub use repository::{IndexOutOfRange, Repository};

/// Configuration file handling.
pub mod config;
pub use config::{Config, SheetConfig, StoreKind};
