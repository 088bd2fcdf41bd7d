use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

mod config;
mod edit;
mod list;
mod show;
mod terminal;

use clap::ArgAction;
use dietweek::{
    Config, Form, FormError, JsonFileStore, Record, SheetStore, Store, StoreError, WeekLabel,
    domain::{StoreKind, config::CONFIG_FILE},
    storage::GoogleSheet,
};
use edit::{Edit, Fill};
use list::List;
use show::Show;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the data file and configuration
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List saved weeks, most recent first (default)
    List(List),

    /// Start a new week
    New(New),

    /// Show one week day by day
    Show(Show),

    /// Change fields of a week
    Edit(Edit),

    /// Fill in a week interactively
    Fill(Fill),

    /// Copy a week's goal and meals into a new week
    ///
    /// Weights and ratings are left empty in the copy.
    Copy(Copy),

    /// Delete a week
    Delete(Delete),

    /// Write a default configuration file
    Init,

    /// Show or modify configuration settings
    Config(config::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(&root)?,
            Self::New(command) => command.run(&root)?,
            Self::Show(command) => command.run(&root)?,
            Self::Edit(command) => command.run(&root)?,
            Self::Fill(command) => command.run(&root)?,
            Self::Copy(command) => command.run(&root)?,
            Self::Delete(command) => command.run(&root)?,
            Self::Init => init(&root)?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// A 1-based week number as shown by `dw list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekNumber(NonZeroUsize);

impl WeekNumber {
    /// The position of the week in the collection.
    pub const fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl std::str::FromStr for WeekNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<NonZeroUsize>()
            .map(Self)
            .map_err(|_| format!("'{s}' is not a week number (see `dw list`)"))
    }
}

impl std::fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stands in for a store that could not be opened.
///
/// Loading yields the connection error, so the session starts empty, and
/// every save fails with the same reason.
struct Offline {
    reason: String,
    not_configured: bool,
}

impl Offline {
    fn new(error: &StoreError) -> Self {
        match error {
            StoreError::NotConfigured(reason) => Self {
                reason: reason.clone(),
                not_configured: true,
            },
            other => Self {
                reason: other.to_string(),
                not_configured: false,
            },
        }
    }

    fn error(&self) -> StoreError {
        if self.not_configured {
            StoreError::NotConfigured(self.reason.clone())
        } else {
            StoreError::Unreachable(self.reason.clone())
        }
    }
}

impl Store for Offline {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        Err(self.error())
    }

    fn save(&mut self, _records: &[Record]) -> Result<(), StoreError> {
        Err(self.error())
    }
}

fn open_store(root: &Path, config: &Config) -> Box<dyn Store> {
    match config.store {
        StoreKind::Json => Box::new(JsonFileStore::new(config.data_path(root))),
        StoreKind::Sheet => match GoogleSheet::connect(&config.sheet, root) {
            Ok(sheet) => Box::new(SheetStore::new(sheet)),
            Err(e) => Box::new(Offline::new(&e)),
        },
    }
}

/// Opens the form over the configured store.
///
/// A store that cannot be loaded is reported as a warning and the session
/// continues with no weeks.
fn open_form(root: &Path) -> Form<Box<dyn Store>> {
    let config = Config::load_or_default(root);
    let form = Form::open(open_store(root, &config), config.week_label());

    if let Some(error) = form.load_error() {
        eprintln!(
            "{}",
            format!("⚠️  Could not load saved weeks: {}", error_chain(error)).warning()
        );
    }
    form
}

/// Opens the form for a command that writes.
///
/// Refuses to continue if the data could be reached but not read, since
/// saving would replace it. An unconfigured or unreachable store cannot be
/// written either, so those sessions go ahead and fail on save.
fn open_form_for_writing(root: &Path) -> anyhow::Result<Form<Box<dyn Store>>> {
    let form = open_form(root);
    match form.load_error() {
        None | Some(StoreError::NotConfigured(_) | StoreError::Unreachable(_)) => Ok(form),
        Some(_) => {
            anyhow::bail!("Refusing to overwrite unreadable data; fix or move the data file first")
        }
    }
}

/// Turns a missing week into a readable error.
fn week_error(error: FormError, week: WeekNumber) -> anyhow::Error {
    match error {
        FormError::Index(e) => anyhow::anyhow!("No week {week} (there are {} saved)", e.len),
        other => anyhow::Error::new(other),
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

fn report_saved(record: &Record, label: &WeekLabel, action: &str) {
    println!(
        "{}",
        format!("✅ {action} \"{}\"", record.display_title(label)).success()
    );
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// Title of the week (defaults to a "week of" label for today)
    #[arg(long, short)]
    title: Option<String>,

    /// Goal for the week
    #[arg(long, short)]
    goal: Option<String>,
}

impl New {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut form = open_form_for_writing(root)?;
        let label = form.label().clone();
        form.new_week();
        if let Some(title) = self.title {
            form.set_title(title)?;
        }
        if let Some(goal) = self.goal {
            form.set_goal(goal)?;
        }

        let saved = form.save()?;
        report_saved(saved, &label, "Saved new week");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Copy {
    /// Number of the week to copy, as shown by `dw list`
    week: WeekNumber,
}

impl Copy {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut form = open_form_for_writing(root)?;
        let label = form.label().clone();
        let copy = form
            .duplicate(self.week.index())
            .map_err(|e| week_error(e, self.week))?;
        report_saved(copy, &label, &format!("Copied week {} to", self.week));
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// Number of the week to delete, as shown by `dw list`
    week: WeekNumber,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut form = open_form_for_writing(root)?;

        let title = form
            .repository()
            .get(self.week.index())
            .map_err(|e| week_error(e.into(), self.week))?
            .display_title(form.label())
            .into_owned();

        if !self.yes {
            let proceed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete week {} \"{title}\"?", self.week))
                .default(false)
                .interact()?;
            if !proceed {
                println!("Cancelled");
                return Ok(());
            }
        }

        form.delete(self.week.index())
            .map_err(|e| week_error(e, self.week))?;
        println!("{}", format!("✅ Deleted \"{title}\"").success());
        Ok(())
    }
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!(
            "Already initialized (found existing {})",
            config_path.display()
        );
    }

    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

    let config = Config::default();
    config
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

    println!("Initialized diet log in {}", root.display());
    println!("  Created: {CONFIG_FILE}");
    println!(
        "  Weeks will be saved to: {}",
        config.data_file.display().to_string().dim()
    );
    println!();
    println!("Next steps:");
    println!("  dw new --goal \"Drink 2L of water a day\"");

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn week_numbers_are_one_based() {
        let week: WeekNumber = "3".parse().unwrap();
        assert_eq!(week.index(), 2);
        assert_eq!(week.to_string(), "3");
        assert!("0".parse::<WeekNumber>().is_err());
        assert!("first".parse::<WeekNumber>().is_err());
    }

    #[test]
    fn json_store_is_used_by_default() {
        let tmp = TempDir::new().unwrap();
        let mut form = open_form(tmp.path());
        form.new_week();
        form.save().unwrap();

        assert!(tmp.path().join("romi_data.json").exists());
    }

    #[test]
    fn unconfigured_sheet_opens_empty_and_refuses_saves() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.store = StoreKind::Sheet;
        config.save(&tmp.path().join(CONFIG_FILE)).unwrap();

        let mut form = open_form(tmp.path());

        assert!(form.repository().is_empty());
        assert!(matches!(
            form.load_error(),
            Some(StoreError::NotConfigured(_))
        ));

        form.new_week();
        assert!(matches!(
            form.save(),
            Err(FormError::Store(StoreError::NotConfigured(_)))
        ));
        assert_eq!(form.repository().len(), 1);
    }

    #[test]
    fn unreadable_data_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("romi_data.json");
        std::fs::write(&data, "not json at all").unwrap();

        assert!(open_form_for_writing(tmp.path()).is_err());
        assert_eq!(std::fs::read_to_string(&data).unwrap(), "not json at all");
    }

    #[test]
    fn data_file_with_invalid_utf8_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("romi_data.json");
        let mut week = Record::blank("week");
        week.goal = "GOAL".to_string();
        JsonFileStore::new(data.clone())
            .save(&[week, Record::blank("older week")])
            .unwrap();

        // A goal saved by an editor using a legacy Korean code page.
        let mut bytes = std::fs::read(&data).unwrap();
        let at = bytes.windows(4).position(|w| w == b"GOAL").unwrap();
        bytes[at] = 0xB9;
        std::fs::write(&data, &bytes).unwrap();

        assert!(open_form_for_writing(tmp.path()).is_err());
        assert_eq!(std::fs::read(&data).unwrap(), bytes);
    }

    #[test]
    fn unreachable_store_still_allows_writing_commands() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.store = StoreKind::Sheet;
        config.save(&tmp.path().join(CONFIG_FILE)).unwrap();

        assert!(open_form_for_writing(tmp.path()).is_ok());
    }

    #[test]
    fn init_refuses_to_overwrite_config() {
        let tmp = TempDir::new().unwrap();
        init(tmp.path()).unwrap();
        assert!(tmp.path().join(CONFIG_FILE).exists());
        assert!(init(tmp.path()).is_err());
    }
}
