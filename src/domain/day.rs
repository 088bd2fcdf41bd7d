use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

/// One of the seven fixed weekday codes, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    /// Monday
    Mon,
    /// Tuesday
    Tue,
    /// Wednesday
    Wed,
    /// Thursday
    Thu,
    /// Friday
    Fri,
    /// Saturday
    Sat,
    /// Sunday
    Sun,
}

impl Weekday {
    /// All weekdays in display order.
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// The three-letter code used as the key in persisted records.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    /// The full English name of the day.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mon => "Monday",
            Self::Tue => "Tuesday",
            Self::Wed => "Wednesday",
            Self::Thu => "Thursday",
            Self::Fri => "Friday",
            Self::Sat => "Saturday",
            Self::Sun => "Sunday",
        }
    }

    const fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A string that is not a recognised weekday.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weekday '{0}' (expected one of Mon, Tue, Wed, Thu, Fri, Sat, Sun)")]
pub struct UnknownWeekday(pub String);

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    /// Accepts the three-letter code or the full name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| {
                day.code().eq_ignore_ascii_case(needle) || day.name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownWeekday(s.to_string()))
    }
}

/// How a day went.
///
/// The set is closed: a day either carries one of these or no rating at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    /// A great day (😍).
    Great,
    /// A decent day (🙂).
    Good,
    /// A rough day (😅).
    Tough,
}

impl Rating {
    /// All ratings, best first.
    pub const ALL: [Self; 3] = [Self::Great, Self::Good, Self::Tough];

    /// The identifier written to storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Great => "great",
            Self::Good => "good",
            Self::Tough => "tough",
        }
    }

    /// The emoji the rating is shown as.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Great => "😍",
            Self::Good => "🙂",
            Self::Tough => "😅",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not one of the closed set of ratings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating '{0}' (expected great, good or tough)")]
pub struct UnknownRating(pub String);

impl FromStr for Rating {
    type Err = UnknownRating;

    /// Accepts the identifier (case-insensitive) or the emoji.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str().eq_ignore_ascii_case(needle) || rating.emoji() == needle)
            .ok_or_else(|| UnknownRating(s.to_string()))
    }
}

/// One day's log: weight, the four meal slots and a mood rating.
///
/// Weight is free text and is stored exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayEntry {
    /// Body weight, as typed.
    pub weight: String,
    /// Breakfast.
    pub breakfast: String,
    /// Lunch.
    pub lunch: String,
    /// Snack.
    pub snack: String,
    /// Dinner.
    pub dinner: String,
    /// Mood rating, if one was given.
    pub rating: Option<Rating>,
}

impl DayEntry {
    /// Returns `true` if nothing has been entered for the day.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.rating.is_none()
            && [
                &self.weight,
                &self.breakfast,
                &self.lunch,
                &self.snack,
                &self.dinner,
            ]
            .iter()
            .all(|field| field.is_empty())
    }

    /// Clears the weight and rating, keeping the meals.
    pub fn reset_measurements(&mut self) {
        self.weight.clear();
        self.rating = None;
    }
}

/// The seven day entries of a week, one per [`Weekday`].
///
/// The set of days is fixed: entries can be edited but never added or
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Days([DayEntry; 7]);

impl Days {
    /// Returns the entry for the given day.
    #[must_use]
    pub const fn get(&self, day: Weekday) -> &DayEntry {
        &self.0[day.position()]
    }

    /// Returns a mutable reference to the entry for the given day.
    pub fn get_mut(&mut self, day: Weekday) -> &mut DayEntry {
        &mut self.0[day.position()]
    }

    /// Iterates over the days in order, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayEntry)> {
        Weekday::ALL.into_iter().zip(self.0.iter())
    }

    /// Iterates mutably over the days in order, Monday first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Weekday, &mut DayEntry)> {
        Weekday::ALL.into_iter().zip(self.0.iter_mut())
    }

    /// Number of days with anything entered.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.0.iter().filter(|entry| !entry.is_blank()).count()
    }
}

impl Index<Weekday> for Days {
    type Output = DayEntry;

    fn index(&self, day: Weekday) -> &Self::Output {
        self.get(day)
    }
}

impl IndexMut<Weekday> for Days {
    fn index_mut(&mut self, day: Weekday) -> &mut Self::Output {
        self.get_mut(day)
    }
}

impl FromIterator<(Weekday, DayEntry)> for Days {
    /// Builds a full week from any subset of days. Days that are not supplied
    /// are left blank; a repeated day keeps the last entry.
    fn from_iter<I: IntoIterator<Item = (Weekday, DayEntry)>>(iter: I) -> Self {
        let mut days = Self::default();
        for (day, entry) in iter {
            days[day] = entry;
        }
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parses_codes_and_names() {
        assert_eq!("Mon".parse::<Weekday>().unwrap(), Weekday::Mon);
        assert_eq!("sunday".parse::<Weekday>().unwrap(), Weekday::Sun);
        assert_eq!(" WED ".parse::<Weekday>().unwrap(), Weekday::Wed);
        assert!("Funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn rating_parses_names_and_emoji() {
        assert_eq!("great".parse::<Rating>().unwrap(), Rating::Great);
        assert_eq!("Tough".parse::<Rating>().unwrap(), Rating::Tough);
        assert_eq!("🙂".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!(
            "meh".parse::<Rating>().unwrap_err(),
            UnknownRating("meh".to_string())
        );
    }

    #[test]
    fn default_days_has_seven_blank_entries() {
        let days = Days::default();
        let codes: Vec<_> = days.iter().map(|(day, _)| day.code()).collect();
        assert_eq!(codes, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert!(days.iter().all(|(_, entry)| entry.is_blank()));
        assert_eq!(days.filled(), 0);
    }

    #[test]
    fn collecting_partial_days_fills_the_rest() {
        let friday = DayEntry {
            dinner: "pizza".to_string(),
            ..DayEntry::default()
        };
        let days: Days = [(Weekday::Fri, friday.clone())].into_iter().collect();

        assert_eq!(days[Weekday::Fri], friday);
        assert!(days[Weekday::Mon].is_blank());
        assert_eq!(days.filled(), 1);
    }

    #[test]
    fn reset_measurements_keeps_meals() {
        let mut entry = DayEntry {
            weight: "61.2".to_string(),
            breakfast: "oats".to_string(),
            rating: Some(Rating::Good),
            ..DayEntry::default()
        };
        entry.reset_measurements();

        assert_eq!(entry.weight, "");
        assert_eq!(entry.rating, None);
        assert_eq!(entry.breakfast, "oats");
    }
}
