//! Household configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file describes
//! the original three-room household:
//!
//! ```toml
//! start_date = "2023-12-09"
//! utc_offset_hours = 1
//! rooms = ["Zimmer 1", "Zimmer 2", { id = "Zimmer 3", name = "Anna" }]
//! strategy = "tabulated"
//! weeks = 4
//! first_bathroom_room = "Zimmer 3"
//!
//! # Optional custom table for the tabulated strategy
//! [[table]]
//! "Zimmer 1" = "garbage_kitchen"
//! "Zimmer 2" = "bathroom"
//! "Zimmer 3" = "free"
//! ```

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::calendar::WeekResolver;
use crate::error::{Result, RotaError};
use crate::models::{room_index, rooms_from_ids, DutyKind, Room, WeekAssignment};
use crate::scheduler::{Rota, RotatingGenerator, RotationState, RotationStrategy, TabulatedPattern};
use crate::state::{StateStore, DEFAULT_STATE_FILE};
use crate::validation::{
    validate_rooms, validate_table, validate_week_count, ValidationError, ValidationErrorKind,
};

/// Westernmost supported UTC offset, in hours.
pub const MIN_UTC_OFFSET_HOURS: i32 = -12;
/// Easternmost supported UTC offset, in hours.
pub const MAX_UTC_OFFSET_HOURS: i32 = 14;

const APP_DIR: &str = "u-rota";

/// Rotation settings for one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotaConfig {
    /// Anchor date; its Monday-to-Sunday week is week 0.
    pub start_date: NaiveDate,
    /// Fixed offset applied to the UTC clock, in whole hours.
    pub utc_offset_hours: i32,
    /// Rooms in rotation order: bare ids or `{ id, name }` tables.
    pub rooms: Vec<Room>,
    /// Rotation design.
    pub strategy: RotationStrategy,
    /// Default display horizon for schedule listings.
    pub weeks: usize,
    /// Room taking the first bathroom turn in the rotating strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_bathroom_room: Option<String>,
    /// Location of the persisted rotation record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,
    /// Custom table for the tabulated strategy. Empty = built-in table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<BTreeMap<String, DutyKind>>,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2023, 12, 9).unwrap_or_default(),
            utc_offset_hours: 1,
            rooms: rooms_from_ids(["Zimmer 1", "Zimmer 2", "Zimmer 3"]),
            strategy: RotationStrategy::Tabulated,
            weeks: 4,
            first_bathroom_room: Some("Zimmer 3".to_string()),
            state_path: None,
            table: Vec::new(),
        }
    }
}

impl RotaConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RotaError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| RotaError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RotaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Explicit file if given, else the default file if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let default_path = Self::default_config_path();
        if default_path.exists() {
            tracing::debug!("loading config from {}", default_path.display());
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path: `~/.config/u-rota/config.toml`.
    pub fn default_config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Configured state path, or `task_data.json` beside the default config.
    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| config_dir().join(DEFAULT_STATE_FILE))
    }

    /// Rooms in rotation order.
    pub fn room_list(&self) -> Vec<Room> {
        self.rooms.clone()
    }

    /// Checks every setting, collecting all problems.
    ///
    /// # Errors
    ///
    /// Returns [`RotaError::Validation`] listing each invalid setting.
    pub fn validate(&self) -> Result<()> {
        let rooms = self.room_list();
        let mut errors = Vec::new();

        errors.extend(validate_rooms(&rooms).err().unwrap_or_default());
        errors.extend(validate_week_count(self.weeks).err().unwrap_or_default());

        if !(MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&self.utc_offset_hours) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSetting,
                format!(
                    "UTC offset {} is outside {MIN_UTC_OFFSET_HOURS}..={MAX_UTC_OFFSET_HOURS}",
                    self.utc_offset_hours
                ),
            ));
        }

        if let Some(room) = &self.first_bathroom_room {
            if room_index(&rooms, room).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRoom,
                    format!("first_bathroom_room '{room}' is not a configured room"),
                ));
            }
        }

        if !self.table.is_empty() {
            errors.extend(
                validate_table(&self.table_rows(), &rooms)
                    .err()
                    .unwrap_or_default(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RotaError::Validation(errors))
        }
    }

    /// Rotation seed for the rotating strategy.
    ///
    /// A persisted last-bathroom room takes precedence over
    /// `first_bathroom_room`; with neither, the last room counts as having
    /// had the previous turn.
    ///
    /// # Errors
    ///
    /// Returns [`RotaError::UnknownRoom`] if a named room is not configured.
    pub fn seed(&self, persisted_last_bathroom: Option<&str>) -> Result<RotationState> {
        let rooms = self.room_list();
        let lookup = |name: &str| {
            room_index(&rooms, name).ok_or_else(|| RotaError::UnknownRoom(name.to_string()))
        };

        if let Some(name) = persisted_last_bathroom {
            return Ok(RotationState::after_bathroom(lookup(name)?));
        }
        match &self.first_bathroom_room {
            Some(name) => Ok(RotationState::first_bathroom(lookup(name)?, rooms.len())),
            None => Ok(RotationState::initial(rooms.len())),
        }
    }

    /// Room to record as last bathroom room when bootstrapping the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured seed room is unknown or no rooms exist.
    pub fn default_last_bathroom(&self) -> Result<String> {
        let seed = self.seed(None)?;
        self.rooms
            .get(seed.last_bathroom)
            .map(|room| room.id.clone())
            .ok_or_else(|| RotaError::Config("no rooms configured".to_string()))
    }

    /// Builds the rota described by this configuration.
    ///
    /// `persisted_last_bathroom` seeds the rotating strategy; the tabulated
    /// strategy ignores it.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a named room is unknown.
    pub fn build_rota(&self, persisted_last_bathroom: Option<&str>) -> Result<Rota> {
        self.validate()?;

        if self.start_date.weekday() != Weekday::Mon {
            tracing::warn!(
                "start_date {} is not a Monday; week 0 is the week of {}",
                self.start_date,
                crate::calendar::monday_of(self.start_date)
            );
        }

        let resolver = WeekResolver::new(self.start_date, self.utc_offset_hours)?;
        let rooms = self.room_list();

        let rota = match self.strategy {
            RotationStrategy::Tabulated if self.table.is_empty() => {
                Rota::new(TabulatedPattern::household(rooms)?, resolver)
            }
            RotationStrategy::Tabulated => {
                Rota::new(TabulatedPattern::new(rooms, self.table_rows())?, resolver)
            }
            RotationStrategy::Rotating => {
                let seed = self.seed(persisted_last_bathroom)?;
                Rota::new(RotatingGenerator::with_seed(rooms, seed)?, resolver)
            }
        };

        tracing::debug!(
            strategy = %self.strategy,
            cycle_length = rota.cycle_length(),
            "rota ready"
        );
        Ok(rota)
    }

    /// Builds the rota, reading the persisted seed for the rotating strategy.
    ///
    /// The state file is bootstrapped with [`default_last_bathroom`] when it
    /// is missing, unusable, or names a room that is no longer configured.
    ///
    /// [`default_last_bathroom`]: Self::default_last_bathroom
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the state file cannot be
    /// locked or written.
    pub fn open_rota(&self) -> Result<Rota> {
        let persisted = match self.strategy {
            RotationStrategy::Rotating => {
                self.validate()?;
                let store = StateStore::new(self.state_path());
                Some(store.load_or_init(&self.default_last_bathroom()?, &self.rooms)?)
            }
            RotationStrategy::Tabulated => None,
        };
        self.build_rota(persisted.as_deref())
    }

    fn table_rows(&self) -> Vec<WeekAssignment> {
        self.table
            .iter()
            .map(|row| {
                row.iter()
                    .fold(WeekAssignment::default(), |acc, (room, duty)| {
                        acc.with(room.clone(), duty.clone())
                    })
            })
            .collect()
    }
}

fn config_dir() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join(APP_DIR)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config").join(APP_DIR)
    } else {
        PathBuf::from("/tmp").join(APP_DIR)
    }
}
