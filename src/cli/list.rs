use std::{borrow::Cow, path::Path};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dietweek::{Record, Repository, WeekLabel, Weekday};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Command arguments for `dw list`.
#[derive(Debug, Default, Parser)]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let form = super::open_form(root);
        let rows = rows(form.repository(), form.label());

        match self.output {
            OutputFormat::Table => render_table(&rows),
            OutputFormat::Json => render_json(&rows)?,
        }
        Ok(())
    }
}

/// One line of the listing.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct Row<'a> {
    number: usize,
    id: &'a str,
    title: Cow<'a, str>,
    goal: &'a str,
    days_logged: usize,
}

impl<'a> Row<'a> {
    fn new(number: usize, record: &'a Record, label: &WeekLabel) -> Self {
        Self {
            number,
            id: record.id().as_str(),
            title: record.display_title(label),
            goal: &record.goal,
            days_logged: record.days.filled(),
        }
    }
}

fn rows<'a>(repository: &'a Repository, label: &WeekLabel) -> Vec<Row<'a>> {
    repository
        .iter()
        .enumerate()
        .map(|(index, record)| Row::new(index + 1, record, label))
        .collect()
}

fn render_table(rows: &[Row<'_>]) {
    if rows.is_empty() {
        println!("No weeks saved yet. Start one with `dw new`.");
        return;
    }

    if terminal::is_narrow() {
        for row in rows {
            println!("{:>3}  {}", row.number, row.title);
        }
        return;
    }

    let headers = ["#", "TITLE", "GOAL", "DAYS"];
    let data: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.number.to_string(),
                row.title.to_string(),
                row.goal.to_string(),
                format!("{}/{}", row.days_logged, Weekday::ALL.len()),
            ]
        })
        .collect();

    // Column widths from the plain text, before any coloring.
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (idx, value) in row.iter().enumerate() {
            let width = widths[idx];
            let padded = format!("{value:<width$}");
            if idx == 0 {
                print!("{}  ", padded.dim());
            } else {
                print!("{padded}  ");
            }
        }
        println!();
    }
}

fn render_json(rows: &[Row<'_>]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows).context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_numbered_from_one_in_display_order() {
        let mut newest = Record::blank("newest");
        newest.goal = "more greens".to_string();
        newest.day_mut(Weekday::Tue).lunch = "bibimbap".to_string();
        let repository = Repository::from_records([newest.clone(), Record::blank("")]);
        let label = WeekLabel::default();

        let rows = rows(&repository, &label);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            Row {
                number: 1,
                id: newest.id().as_str(),
                title: Cow::Borrowed("newest"),
                goal: "more greens",
                days_logged: 1,
            }
        );
        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].title, label.today());
        assert_eq!(rows[1].days_logged, 0);
    }

    #[test]
    fn json_rows_use_snake_case_keys() {
        let record = Record::blank("week");
        let value = serde_json::to_value(Row::new(1, &record, &WeekLabel::default())).unwrap();

        assert_eq!(value["number"], 1);
        assert_eq!(value["title"], "week");
        assert_eq!(value["days_logged"], 0);
    }
}
