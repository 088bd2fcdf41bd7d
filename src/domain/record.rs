use std::{borrow::Cow, fmt};

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::domain::{DayEntry, Days, WeekLabel, Weekday};

/// Shown for a cleared title when the week's creation date is unknown.
const UNTITLED: &str = "(untitled week)";

/// Opaque, unique identifier of a [`Record`].
///
/// Freshly created records get a time-ordered UUID (version 7), which also
/// records when the week was created. Identifiers read back from storage are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a new identifier that will not collide with any other
    /// generated in this or any other process.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// When the identified record was created, if the identifier says.
    ///
    /// Known for version 7 UUIDs and for the older `<seconds>.<fraction>`
    /// timestamp ids.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(uuid) = Uuid::parse_str(&self.0) {
            let (secs, nanos) = uuid.get_timestamp()?.to_unix();
            return DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos);
        }

        let (secs, fraction) = self.0.split_once('.').unwrap_or((&self.0, "0"));
        if secs.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        DateTime::from_timestamp(secs.parse().ok()?, 0)
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One tracked week.
///
/// A record always holds exactly seven [`DayEntry`] values, one per
/// [`Weekday`]. Its identifier is fixed at creation; everything else is
/// editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    /// Human label for the week. May be edited to anything, including empty.
    pub title: String,
    /// Free-text goal for the week.
    pub goal: String,
    /// The seven day entries.
    pub days: Days,
}

impl Record {
    /// Creates a blank week with a fresh identifier.
    #[must_use]
    pub fn blank(title: impl Into<String>) -> Self {
        Self::from_parts(RecordId::generate(), title.into(), String::new(), Days::default())
    }

    /// Reassembles a record from its stored parts.
    #[must_use]
    pub const fn from_parts(id: RecordId, title: String, goal: String, days: Days) -> Self {
        Self {
            id,
            title,
            goal,
            days,
        }
    }

    /// The record's identifier.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// The title to show for this week.
    ///
    /// A cleared title falls back to the default `label` for the day the week
    /// was created, or to a placeholder if that day is unknown.
    #[must_use]
    pub fn display_title(&self, label: &WeekLabel) -> Cow<'_, str> {
        if !self.title.trim().is_empty() {
            return Cow::Borrowed(&self.title);
        }
        self.id.created_at().map_or(Cow::Borrowed(UNTITLED), |created| {
            Cow::Owned(label.for_date(created.with_timezone(&Local).date_naive()))
        })
    }

    /// Returns the entry for the given day.
    #[must_use]
    pub const fn day(&self, day: Weekday) -> &DayEntry {
        self.days.get(day)
    }

    /// Returns a mutable reference to the entry for the given day.
    pub fn day_mut(&mut self, day: Weekday) -> &mut DayEntry {
        self.days.get_mut(day)
    }

    /// Makes a copy of this week to plan a new one from.
    ///
    /// The copy gets a new identifier and the given title. The goal and every
    /// meal are carried over; weights and ratings are cleared.
    #[must_use]
    pub fn duplicate(&self, title: impl Into<String>) -> Self {
        let mut days = self.days.clone();
        for (_, entry) in days.iter_mut() {
            entry.reset_measurements();
        }
        Self::from_parts(RecordId::generate(), title.into(), self.goal.clone(), days)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::Rating;

    fn logged_week() -> Record {
        let mut record = Record::blank("Week of Jan 1");
        record.goal = "drink water".to_string();
        for (day, entry) in record.days.iter_mut() {
            entry.weight = "60.5".to_string();
            entry.breakfast = format!("{day} oats");
            entry.lunch = "salad".to_string();
            entry.snack = "apple".to_string();
            entry.dinner = "soup".to_string();
            entry.rating = Some(Rating::Great);
        }
        record
    }

    #[test]
    fn blank_record_has_seven_blank_days() {
        let record = Record::blank("Week of Jan 1");
        assert_eq!(record.title, "Week of Jan 1");
        assert_eq!(record.goal, "");
        assert_eq!(record.days.iter().count(), 7);
        assert!(record.days.iter().all(|(_, entry)| entry.is_blank()));
    }

    #[test]
    fn generated_ids_do_not_collide() {
        let ids: HashSet<_> = (0..1000).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn duplicate_resets_weight_and_rating_only() {
        let original = logged_week();
        let copy = original.duplicate("Week of Jan 8");

        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.title, "Week of Jan 8");
        assert_eq!(copy.goal, original.goal);
        for ((day, copied), (_, source)) in copy.days.iter().zip(original.days.iter()) {
            assert_eq!(copied.weight, "", "{day} weight");
            assert_eq!(copied.rating, None, "{day} rating");
            assert_eq!(copied.breakfast, source.breakfast);
            assert_eq!(copied.lunch, source.lunch);
            assert_eq!(copied.snack, source.snack);
            assert_eq!(copied.dinner, source.dinner);
        }
    }

    #[test]
    fn duplicate_leaves_original_untouched() {
        let original = logged_week();
        let before = original.clone();
        let _ = original.duplicate("copy");
        assert_eq!(original, before);
    }

    fn week_with_id(id: &str) -> Record {
        Record::from_parts(
            RecordId::from(id.to_string()),
            String::new(),
            String::new(),
            Days::default(),
        )
    }

    #[test]
    fn generated_ids_carry_their_creation_time() {
        let before = Utc::now() - chrono::Duration::seconds(1);
        let created = RecordId::generate().created_at().unwrap();
        assert!(created >= before);
        assert!(created <= Utc::now() + chrono::Duration::seconds(1));
    }

    #[test]
    fn timestamp_ids_carry_their_creation_time() {
        let id = RecordId::from("1704110400.123456".to_string());
        assert_eq!(
            id.created_at(),
            DateTime::from_timestamp(1_704_110_400, 0)
        );
        assert_eq!(
            RecordId::from("1704110400".to_string()).created_at(),
            DateTime::from_timestamp(1_704_110_400, 0)
        );
        assert_eq!(RecordId::from("week-1".to_string()).created_at(), None);
        assert_eq!(RecordId::from("12.ab".to_string()).created_at(), None);
    }

    #[test]
    fn title_is_displayed_as_entered() {
        let record = Record::blank("Week of Jan 1");
        assert_eq!(record.display_title(&WeekLabel::default()), "Week of Jan 1");
    }

    #[test]
    fn cleared_title_falls_back_to_label_for_creation_day() {
        // Midday UTC on 2024-01-01, so the local date is the 1st nearly everywhere.
        let record = week_with_id("1704110400.5");
        let label = WeekLabel::new("%Y-%m-%d week").unwrap();

        assert_eq!(record.display_title(&label), "2024-01-01 week");
        assert_eq!(record.title, "");
    }

    #[test]
    fn cleared_title_of_fresh_week_uses_todays_label() {
        let mut record = Record::blank("Week of Jan 1");
        record.title.clear();
        let label = WeekLabel::default();

        assert_eq!(record.display_title(&label), label.today());
    }

    #[test]
    fn cleared_title_without_creation_time_uses_placeholder() {
        let record = week_with_id("week-1");
        assert_eq!(record.display_title(&WeekLabel::default()), UNTITLED);
    }
}
