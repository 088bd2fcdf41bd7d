//! The form controller.
//!
//! A [`Form`] owns the session's [`Repository`] and the [`Store`] behind it,
//! and binds at most one [`Record`] for editing. Field edits only touch the
//! bound record; nothing is persisted until [`Form::save`].

use crate::{
    DayEntry, IndexOutOfRange, Record, Repository, Store, StoreError, WeekLabel, Weekday,
};

/// Errors raised by [`Form`] operations.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The operation needs a week open for editing and there is none.
    #[error("no week is open for editing")]
    NoCurrentRecord,

    /// The requested week does not exist.
    #[error(transparent)]
    Index(#[from] IndexOutOfRange),

    /// The collection could not be written.
    #[error("failed to save weeks")]
    Store(#[from] StoreError),
}

/// Binds one week for editing and persists the collection on request.
#[derive(Debug)]
pub struct Form<S> {
    store: S,
    repository: Repository,
    label: WeekLabel,
    current: Option<Record>,
    load_error: Option<StoreError>,
}

impl<S: Store> Form<S> {
    /// Loads the collection from `store` and opens a form with no week bound.
    ///
    /// If loading fails the form starts with an empty collection, so new
    /// weeks can still be created. The failure is kept for the caller to
    /// report (see [`Form::load_error`]).
    pub fn open(store: S, label: WeekLabel) -> Self {
        let (repository, load_error) = match store.load() {
            Ok(records) => (Repository::from_records(records), None),
            Err(e) => {
                tracing::warn!("Failed to load weeks, starting empty: {e}");
                (Repository::new(), Some(e))
            }
        };

        Self {
            store,
            repository,
            label,
            current: None,
            load_error,
        }
    }

    /// The error that prevented the collection from loading, if any.
    #[must_use]
    pub const fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// All weeks of the session, most recent first.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The label used to title new weeks.
    #[must_use]
    pub const fn label(&self) -> &WeekLabel {
        &self.label
    }

    /// The week bound for editing, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// Returns `true` if a week is bound for editing.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.current.is_some()
    }

    /// Binds the given week for editing.
    pub fn select(&mut self, record: Record) -> &mut Record {
        tracing::debug!("Editing week {}", record.id());
        self.current.insert(record)
    }

    /// Binds a copy of the week at `index` for editing.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no week at `index`.
    pub fn select_index(&mut self, index: usize) -> Result<&mut Record, FormError> {
        let record = self.repository.get(index)?.clone();
        Ok(self.select(record))
    }

    /// Binds a fresh blank week, titled with today's label.
    pub fn new_week(&mut self) -> &mut Record {
        let record = Record::blank(self.label.today());
        self.select(record)
    }

    /// Unbinds the current week, discarding unsaved edits.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Mutable access to the bound week.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoCurrentRecord`] if no week is bound.
    pub fn current_mut(&mut self) -> Result<&mut Record, FormError> {
        self.current.as_mut().ok_or(FormError::NoCurrentRecord)
    }

    /// Sets the bound week's title. Any string is accepted, including empty.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoCurrentRecord`] if no week is bound.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), FormError> {
        self.current_mut()?.title = title.into();
        Ok(())
    }

    /// Sets the bound week's goal.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoCurrentRecord`] if no week is bound.
    pub fn set_goal(&mut self, goal: impl Into<String>) -> Result<(), FormError> {
        self.current_mut()?.goal = goal.into();
        Ok(())
    }

    /// Mutable access to one day of the bound week.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoCurrentRecord`] if no week is bound.
    pub fn day_mut(&mut self, day: Weekday) -> Result<&mut DayEntry, FormError> {
        Ok(self.current_mut()?.day_mut(day))
    }

    /// Stores the bound week in the collection and writes the collection out.
    ///
    /// The week stays bound. If the write fails the collection in memory
    /// still holds the week, so saving again retries without losing edits.
    ///
    /// # Errors
    ///
    /// - [`FormError::NoCurrentRecord`] if no week is bound
    /// - [`FormError::Store`] if the store rejects the write
    pub fn save(&mut self) -> Result<&Record, FormError> {
        let record = self.current.clone().ok_or(FormError::NoCurrentRecord)?;
        let index = self.repository.upsert(record);
        self.flush()?;
        Ok(&self.repository.records()[index])
    }

    /// Copies the week at `index` into a new week at the front and writes the
    /// collection out.
    ///
    /// # Errors
    ///
    /// - [`FormError::Index`] if there is no week at `index`
    /// - [`FormError::Store`] if the store rejects the write
    pub fn duplicate(&mut self, index: usize) -> Result<&Record, FormError> {
        let source = self.repository.get(index)?.clone();
        let title = self.label.today();
        self.repository.duplicate(&source, title);
        self.flush()?;
        Ok(&self.repository.records()[0])
    }

    /// Deletes the week at `index` and writes the collection out.
    ///
    /// If the deleted week is the one bound for editing, the form is cleared.
    ///
    /// # Errors
    ///
    /// - [`FormError::Index`] if there is no week at `index`; nothing changes
    /// - [`FormError::Store`] if the store rejects the write
    pub fn delete(&mut self, index: usize) -> Result<Record, FormError> {
        let removed = self.repository.remove(index)?;
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.id() == removed.id())
        {
            self.clear();
        }
        self.flush()?;
        Ok(removed)
    }

    /// Writes the whole collection to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.store.save(self.repository.records())
    }

    /// Consumes the form, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
