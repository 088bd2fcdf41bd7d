use std::fmt::Write;

use chrono::{
    Local, NaiveDate,
    format::{Item, StrftimeItems},
};

/// Default pattern for the title of a new week.
pub(crate) const DEFAULT_TITLE_FORMAT: &str = "Week of %b %-d";

/// Computes the default "week of" title given to new and copied weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekLabel {
    format: String,
}

impl Default for WeekLabel {
    fn default() -> Self {
        Self {
            format: DEFAULT_TITLE_FORMAT.to_string(),
        }
    }
}

/// A title pattern that chrono cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid title format '{0}'")]
pub struct InvalidFormat(pub String);

impl WeekLabel {
    /// Creates a label from a `strftime` pattern such as `Week of %Y-%m-%d`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern contains an unrecognised specifier.
    pub fn new(format: impl Into<String>) -> Result<Self, InvalidFormat> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidFormat(format));
        }
        Ok(Self { format })
    }

    /// The `strftime` pattern.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The title for a week starting on the given date.
    ///
    /// Patterns that need a time of day cannot be rendered from a date; those
    /// fall back to the ISO date.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> String {
        let mut title = String::new();
        if write!(title, "{}", date.format(&self.format)).is_err() {
            tracing::debug!("title format '{}' cannot render a date", self.format);
            return format!("Week of {}", date.format("%Y-%m-%d"));
        }
        title
    }

    /// The title for a week starting today.
    #[must_use]
    pub fn today(&self) -> String {
        self.for_date(Local::now().date_naive())
    }
}
