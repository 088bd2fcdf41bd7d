use std::{path::Path, str::FromStr};

use clap::Parser;
use dialoguer::{Confirm, Input, Select};
use dietweek::{DayEntry, Form, Rating, Record, Store, Weekday};
use tracing::instrument;

use super::{WeekNumber, terminal::Colorize};

/// A rating given on the command line, where `none` clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingArg(Option<Rating>);

impl FromStr for RatingArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "clear" | "-" => Ok(Self(None)),
            _ => s.parse::<Rating>().map(|r| Self(Some(r))).map_err(|e| format!("{e}, or none")),
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Change fields of a saved week")]
pub struct Edit {
    /// Number of the week to edit, as shown by `dw list`
    week: WeekNumber,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New goal
    #[arg(long)]
    goal: Option<String>,

    /// The day the per-day options apply to (Mon..Sun)
    #[arg(long, short)]
    day: Option<Weekday>,

    /// Weight for the day
    #[arg(long, requires = "day")]
    weight: Option<String>,

    /// Breakfast for the day
    #[arg(long, requires = "day")]
    breakfast: Option<String>,

    /// Lunch for the day
    #[arg(long, requires = "day")]
    lunch: Option<String>,

    /// Snack for the day
    #[arg(long, requires = "day")]
    snack: Option<String>,

    /// Dinner for the day
    #[arg(long, requires = "day")]
    dinner: Option<String>,

    /// Rating for the day: great, good, tough or none
    #[arg(long, requires = "day")]
    rating: Option<RatingArg>,
}

impl Edit {
    #[instrument(skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut form = super::open_form_for_writing(root)?;
        let label = form.label().clone();
        let week = self.week;
        form.select_index(week.index())
            .map_err(|e| super::week_error(e, week))?;

        if !self.apply(&mut form)? {
            anyhow::bail!("Nothing to change; pass --title, --goal or --day with a field");
        }

        let saved = form.save()?;
        super::report_saved(saved, &label, "Saved");
        Ok(())
    }

    /// Applies the given options to the bound week.
    ///
    /// Returns `false` if no option changes anything.
    fn apply<S: Store>(self, form: &mut Form<S>) -> anyhow::Result<bool> {
        let mut changed = false;

        if let Some(title) = self.title {
            form.set_title(title)?;
            changed = true;
        }
        if let Some(goal) = self.goal {
            form.set_goal(goal)?;
            changed = true;
        }

        if let Some(day) = self.day {
            let entry = form.day_mut(day)?;
            let fields = [
                (&mut entry.weight, self.weight),
                (&mut entry.breakfast, self.breakfast),
                (&mut entry.lunch, self.lunch),
                (&mut entry.snack, self.snack),
                (&mut entry.dinner, self.dinner),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    *field = value;
                    changed = true;
                }
            }
            if let Some(RatingArg(rating)) = self.rating {
                entry.rating = rating;
                changed = true;
            }
        }

        Ok(changed)
    }
}

#[derive(Debug, Parser)]
#[command(about = "Fill in a week interactively")]
pub struct Fill {
    /// Number of the week to fill in (default: start a new week)
    week: Option<WeekNumber>,

    /// Only ask about these days (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "DAY")]
    days: Vec<Weekday>,
}

impl Fill {
    #[instrument(skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut form = super::open_form_for_writing(root)?;
        let label = form.label().clone();
        let record = match self.week {
            Some(week) => form
                .select_index(week.index())
                .map_err(|e| super::week_error(e, week))?,
            None => form.new_week(),
        };

        let days = if self.days.is_empty() {
            Weekday::ALL.to_vec()
        } else {
            self.days
        };
        prompt_week(record, &days)?;

        let save = Confirm::new()
            .with_prompt("Save this week?")
            .default(true)
            .interact()?;
        if !save {
            println!("{}", "Discarded changes".dim());
            return Ok(());
        }

        let saved = form.save()?;
        super::report_saved(saved, &label, "Saved");
        Ok(())
    }
}

fn prompt_week(record: &mut Record, days: &[Weekday]) -> anyhow::Result<()> {
    record.title = prompt_text("Title", &record.title)?;
    record.goal = prompt_text("Goal", &record.goal)?;

    for &day in days {
        println!("\n{}", day.name().info());
        prompt_day(record.day_mut(day))?;
    }
    Ok(())
}

fn prompt_day(entry: &mut DayEntry) -> anyhow::Result<()> {
    entry.weight = prompt_text("  Weight", &entry.weight)?;
    entry.breakfast = prompt_text("  Breakfast", &entry.breakfast)?;
    entry.lunch = prompt_text("  Lunch", &entry.lunch)?;
    entry.snack = prompt_text("  Snack", &entry.snack)?;
    entry.dinner = prompt_text("  Dinner", &entry.dinner)?;

    let choices = rating_choices();
    let labels: Vec<String> = choices
        .iter()
        .map(|choice| match choice {
            Some(rating) => format!("{} {rating}", rating.emoji()),
            None => "no rating".to_string(),
        })
        .collect();
    let current = choices
        .iter()
        .position(|choice| *choice == entry.rating)
        .unwrap_or(0);

    let selected = Select::new()
        .with_prompt("  How did it go?")
        .items(&labels)
        .default(current)
        .interact()?;
    entry.rating = choices[selected];
    Ok(())
}

fn prompt_text(prompt: &str, current: &str) -> anyhow::Result<String> {
    let value = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn rating_choices() -> Vec<Option<Rating>> {
    std::iter::once(None)
        .chain(Rating::ALL.into_iter().map(Some))
        .collect()
}
