use std::path::Path;

use clap::Parser;
use dietweek::{DayEntry, Record, WeekLabel, storage::schema};
use tracing::instrument;

use super::{
    WeekNumber,
    terminal::{Colorize, rating_badge},
};

#[derive(Debug, Parser)]
#[command(about = "Display one week day by day")]
pub struct Show {
    /// Number of the week to display, as shown by `dw list`
    week: WeekNumber,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let form = super::open_form(root);
        let record = form
            .repository()
            .get(self.week.index())
            .map_err(|e| super::week_error(e.into(), self.week))?;

        match self.output {
            OutputFormat::Pretty => output_pretty(record, form.label()),
            OutputFormat::Json => println!("{}", schema::to_string_pretty(record)?),
        }
        Ok(())
    }
}

fn output_pretty(record: &Record, label: &WeekLabel) {
    println!("# {}", record.display_title(label));
    if record.goal.is_empty() {
        println!("{}\n", "No goal set".dim());
    } else {
        println!("Goal: {}\n", record.goal);
    }

    for (day, entry) in record.days.iter() {
        println!("{}  {}", day.name(), rating_badge(entry.rating));
        if entry.is_blank() {
            println!("  {}", "nothing logged".dim());
            continue;
        }
        for (label, value) in fields(entry) {
            if !value.is_empty() {
                println!("  {label:<10} {value}");
            }
        }
    }
    println!("\n{}", record.id().as_str().dim());
}

fn fields(entry: &DayEntry) -> [(&'static str, &str); 5] {
    [
        ("Weight", entry.weight.as_str()),
        ("Breakfast", entry.breakfast.as_str()),
        ("Lunch", entry.lunch.as_str()),
        ("Snack", entry.snack.as_str()),
        ("Dinner", entry.dinner.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use dietweek::Weekday;

    use super::*;

    #[test]
    fn fields_follow_meal_order() {
        let mut record = Record::blank("week");
        let day = record.day_mut(Weekday::Sat);
        day.weight = "60.2".to_string();
        day.dinner = "salad".to_string();

        let labels: Vec<_> = fields(record.day(Weekday::Sat))
            .iter()
            .map(|(label, value)| format!("{label}={value}"))
            .collect();

        assert_eq!(
            labels,
            [
                "Weight=60.2",
                "Breakfast=",
                "Lunch=",
                "Snack=",
                "Dinner=salad"
            ]
        );
    }
}
