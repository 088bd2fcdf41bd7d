use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::domain::label::{DEFAULT_TITLE_FORMAT, InvalidFormat, WeekLabel};

/// Name of the configuration file inside the data root.
pub const CONFIG_FILE: &str = "dietweek.toml";

/// Which backing medium holds the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// A local JSON file.
    #[default]
    Json,
    /// A spreadsheet, one record per row.
    Sheet,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Sheet => f.write_str("sheet"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sheet" => Ok(Self::Sheet),
            other => Err(format!("unknown store '{other}' (expected json or sheet)")),
        }
    }
}

/// Settings for the spreadsheet store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// The spreadsheet's id, as it appears in its URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// The single-column range holding one record per row.
    #[serde(default = "default_range")]
    pub range: String,

    /// Path to a service-account key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<PathBuf>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: default_range(),
            credentials: None,
        }
    }
}

/// Configuration for the diet log.
///
/// This struct holds settings that control where weeks are stored and how
/// new weeks are titled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Which backing medium to use.
    pub store: StoreKind,

    /// The JSON file records are kept in, relative to the data root.
    pub data_file: PathBuf,

    /// `strftime` pattern for the title of a new week.
    title_format: String,

    /// Spreadsheet settings, used when `store` is [`StoreKind::Sheet`].
    pub sheet: SheetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            data_file: default_data_file(),
            title_format: DEFAULT_TITLE_FORMAT.to_string(),
            sheet: SheetConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration from the data root, falling back to the
    /// defaults if there is no usable config file.
    ///
    /// A file that exists but cannot be used is logged as a warning.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("{e} ({}), using the default configuration", path.display());
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The `strftime` pattern for new week titles.
    #[must_use]
    pub fn title_format(&self) -> &str {
        &self.title_format
    }

    /// Sets the title pattern, rejecting patterns chrono cannot interpret.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern contains an unrecognised specifier.
    pub fn set_title_format(&mut self, format: String) -> Result<(), InvalidFormat> {
        WeekLabel::new(format.clone())?;
        self.title_format = format;
        Ok(())
    }

    /// The label generator for new week titles.
    ///
    /// An unusable pattern in the file falls back to the default label.
    #[must_use]
    pub fn week_label(&self) -> WeekLabel {
        WeekLabel::new(self.title_format.clone()).unwrap_or_else(|e| {
            tracing::warn!("{e}, using the default title format");
            WeekLabel::default()
        })
    }

    /// The absolute location of the JSON data file for the given root.
    #[must_use]
    pub fn data_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data_file)
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("romi_data.json")
}

fn default_title_format() -> String {
    DEFAULT_TITLE_FORMAT.to_string()
}

fn default_range() -> String {
    "Sheet1!A:A".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        store: StoreKind,

        #[serde(default = "default_data_file")]
        data_file: PathBuf,

        #[serde(default = "default_title_format")]
        title_format: String,

        #[serde(default)]
        sheet: SheetConfig,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                store,
                data_file,
                title_format,
                sheet,
            } => Self {
                store,
                data_file,
                title_format,
                sheet,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            store: config.store,
            data_file: config.data_file,
            title_format: config.title_format,
            sheet: config.sheet,
        }
    }
}
