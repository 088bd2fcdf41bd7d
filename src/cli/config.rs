use std::path::{Path, PathBuf};

use dietweek::{
    Config,
    domain::{StoreKind, config::CONFIG_FILE},
    storage::sheet::CREDENTIALS_ENV,
};
use tracing::instrument;

use crate::cli::terminal::Colorize;

const KEYS: &str = "store\n  data_file\n  title_format\n  sheet.spreadsheet_id\n  sheet.range\n  \
                    sheet.credentials";

#[derive(Debug, clap::Parser)]
/// Show or modify configuration
///
/// Configuration is stored in dietweek.toml inside the data root.
///
/// Available configuration keys:
///   store                 Where weeks are kept: json or sheet (default: json)
///   `data_file`             The JSON file, relative to the root (default:
/// `romi_data.json`)
///   `title_format`          strftime pattern for new week titles
///   `sheet.spreadsheet_id`  Id of the spreadsheet to use
///   `sheet.range`           Column holding one week per row (default:
/// Sheet1!A:A)
///   `sheet.credentials`     Service-account key file
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   dw config set store sheet
    ///   dw config set `title_format` "%Y-%m-%d week"
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set; an empty value unsets optional keys
        value: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);

        match self.command {
            ConfigCommand::Show => Self::show_config(&config_path),
            ConfigCommand::Get { key } => Self::get_config(&config_path, &key),
            ConfigCommand::Set { key, value } => Self::set_config(&config_path, &key, &value),
        }
    }

    fn show_config(config_path: &Path) -> anyhow::Result<()> {
        let config = load(config_path)?;

        println!("Configuration:");
        println!("  store: {}", config.store);
        println!("  data_file: {}", config.data_file.display());
        println!(
            "  title_format: {} ({})",
            config.title_format(),
            format!("e.g. \"{}\"", config.week_label().today()).dim()
        );
        println!("  sheet.spreadsheet_id: {}", optional(config.sheet.spreadsheet_id.as_deref()));
        println!("  sheet.range: {}", config.sheet.range);
        println!(
            "  sheet.credentials: {}",
            optional(
                config
                    .sheet
                    .credentials
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .as_deref()
            )
        );
        if std::env::var_os(CREDENTIALS_ENV).is_some() {
            println!(
                "  {}",
                format!("{CREDENTIALS_ENV} is set and overrides sheet.credentials").info()
            );
        }
        Ok(())
    }

    fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
        let config = load(config_path)?;

        let value = match key {
            "store" => config.store.to_string(),
            "data_file" => config.data_file.display().to_string(),
            "title_format" => config.title_format().to_string(),
            "sheet.spreadsheet_id" => config.sheet.spreadsheet_id.unwrap_or_default(),
            "sheet.range" => config.sheet.range,
            "sheet.credentials" => config
                .sheet
                .credentials
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            _ => {
                anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}");
            }
        };
        println!("{value}");
        Ok(())
    }

    fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = load(config_path)?;
        apply(&mut config, key, value)?;
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        println!("{}", format!("Set {key} = {value}").success());
        if key == "store" && config.store == StoreKind::Sheet && config.sheet.spreadsheet_id.is_none()
        {
            println!(
                "\n{}",
                "Set sheet.spreadsheet_id and sheet.credentials before using the sheet store."
                    .info()
            );
        }
        Ok(())
    }
}

fn load(config_path: &Path) -> anyhow::Result<Config> {
    if config_path.exists() {
        Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))
    } else {
        Ok(Config::default())
    }
}

fn apply(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let value = value.trim();
    match key {
        "store" => config.store = value.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        "data_file" => {
            if value.is_empty() {
                anyhow::bail!("data_file cannot be empty");
            }
            config.data_file = PathBuf::from(value);
        }
        "title_format" => config.set_title_format(value.to_string())?,
        "sheet.spreadsheet_id" => config.sheet.spreadsheet_id = non_empty(value),
        "sheet.range" => {
            if value.is_empty() {
                anyhow::bail!("sheet.range cannot be empty");
            }
            config.sheet.range = value.to_string();
        }
        "sheet.credentials" => config.sheet.credentials = non_empty(value).map(PathBuf::from),
        _ => {
            anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}");
        }
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn optional(value: Option<&str>) -> String {
    value.map_or_else(|| "(not set)".dim(), str::to_string)
}
