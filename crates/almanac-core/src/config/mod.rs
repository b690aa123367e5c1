use std::path::PathBuf;

use chrono::NaiveDate;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, FileFormat};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_MAX_CANDIDATES, DEFAULT_SUBSTITUTE_LABEL,
    ENV_PREFIX,
};
use crate::error::{CoreError, CoreResult};


#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub recurrence: RecurrenceConfig,
    pub holidays: HolidayConfig,
    #[serde(default)]
    pub lunar_dates: Vec<LunarDateEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// First day of the week frame used when expanding `BYDAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub max_candidates: usize,
    #[serde(default)]
    pub week_start: WeekStart,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            week_start: WeekStart::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HolidayConfig {
    pub substitute_label: String,
    /// Alternate holiday table. The built-in table is used when unset.
    pub table_path: Option<PathBuf>,
}

/// A lunar date as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LunarDateConfig {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub leap: bool,
}

/// One known lunar -> solar mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LunarDateEntry {
    pub lunar: LunarDateConfig,
    pub solar: NaiveDate,
}

impl Settings {
    /// Builder pre-populated with every default.
    fn defaults() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            .set_default("recurrence.max_candidates", DEFAULT_MAX_CANDIDATES as u64)?
            .set_default("recurrence.week_start", "sunday")?
            .set_default("holidays.substitute_label", DEFAULT_SUBSTITUTE_LABEL)?)
    }

    /// ## Summary
    /// Loads configuration from defaults, environment variables and `almanac.toml`.
    ///
    /// Environment variables use the `ALMANAC_` prefix and `__` as the section
    /// separator, e.g. `ALMANAC_RECURRENCE__MAX_CANDIDATES=500`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating it fails.
    pub fn load() -> CoreResult<Self> {
        let settings = Self::defaults()?
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Builds settings from defaults overlaid with a TOML document.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid TOML, does not match the
    /// settings shape, or fails validation.
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks invariants that serde cannot express.
    ///
    /// ## Errors
    /// Returns `ValidationError` when `recurrence.max_candidates` is zero or a
    /// lunar date entry names an impossible lunar month/day.
    pub fn validate(&self) -> CoreResult<()> {
        if self.recurrence.max_candidates == 0 {
            return Err(CoreError::ValidationError(
                "recurrence.max_candidates must be positive".to_string(),
            ));
        }

        for entry in &self.lunar_dates {
            let lunar = entry.lunar;
            if !(1..=12).contains(&lunar.month) || !(1..=30).contains(&lunar.day) {
                return Err(CoreError::ValidationError(format!(
                    "lunar date {}-{}-{} is out of range",
                    lunar.year, lunar.month, lunar.day
                )));
            }
        }

        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> anyhow::Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        lunar_dates = settings.lunar_dates.len(),
        table = ?settings.holidays.table_path,
        "Configuration loaded"
    );
    Ok(settings)
}
