use core::fmt::{self, Write as _};

use log::{debug, info, warn};

use super::{Config, ConfigError};
use crate::{
    config::{CONFIG_PATH, CONFIG_RECORD_MAX},
    profile::Profile,
    storage::{read_exact, StorageError, Volume},
};

const KEY_TRAP_NAME: &str = "trap_name";
const KEY_MAX_LOG_LINES: &str = "max_log_lines";
const KEY_TAP_COUNT: &str = "tap_count";
const KEY_SENSITIVITY: &str = "sensitivity";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadFailure {
    Missing,
    Storage(StorageError),
    Malformed,
    Rejected(ConfigError),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no record"),
            Self::Storage(err) => write!(f, "read failed: {}", err),
            Self::Malformed => f.write_str("malformed record"),
            Self::Rejected(err) => write!(f, "rejected value: {}", err),
        }
    }
}

/// The persisted `Config`, one `key=value` per line at `/config.txt`.
pub struct ConfigStore;

impl ConfigStore {
    /// Never fails: anything unusable is replaced by the profile defaults, which
    /// are written back straight away.
    pub fn load<V: Volume>(volume: &mut V, profile: &Profile) -> Config {
        match Self::read(volume, profile) {
            Ok(config) => {
                info!(
                    "config: loaded name={} lines={} tap={} sensitivity={}",
                    config.trap_name,
                    config.max_log_lines,
                    config.tap_count.as_u8(),
                    config.sensitivity
                );
                config
            }
            Err(reason) => {
                warn!("config: {}, using defaults", reason);
                let config = Config::defaults(profile);
                if let Err(err) = Self::save(volume, &config) {
                    warn!("config: persisting defaults failed: {}", err);
                }
                config
            }
        }
    }

    pub fn save<V: Volume>(volume: &mut V, config: &Config) -> Result<(), StorageError> {
        let mut record = heapless::String::<CONFIG_RECORD_MAX>::new();
        write!(
            record,
            "{}={}\n{}={}\n{}={}\n{}={}\n",
            KEY_TRAP_NAME,
            config.trap_name,
            KEY_MAX_LOG_LINES,
            config.max_log_lines,
            KEY_TAP_COUNT,
            config.tap_count.as_u8(),
            KEY_SENSITIVITY,
            config.sensitivity
        )
        .map_err(|_| StorageError::Full)?;
        volume.write(CONFIG_PATH, record.as_bytes())
    }

    fn read<V: Volume>(volume: &mut V, profile: &Profile) -> Result<Config, LoadFailure> {
        let len = volume
            .len(CONFIG_PATH)
            .map_err(LoadFailure::Storage)?
            .ok_or(LoadFailure::Missing)?;
        if len > CONFIG_RECORD_MAX {
            return Err(LoadFailure::Malformed);
        }
        let mut raw = [0u8; CONFIG_RECORD_MAX];
        read_exact(volume, CONFIG_PATH, &mut raw[..len]).map_err(LoadFailure::Storage)?;
        let text = core::str::from_utf8(&raw[..len]).map_err(|_| LoadFailure::Malformed)?;
        decode_record(text, profile)
    }
}

fn decode_record(text: &str, profile: &Profile) -> Result<Config, LoadFailure> {
    let mut config = Config::defaults(profile);
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or(LoadFailure::Malformed)?;
        let value = value.trim();
        match key.trim() {
            KEY_TRAP_NAME => {
                config.trap_name = Config::validate_name(value).map_err(LoadFailure::Rejected)?;
            }
            KEY_MAX_LOG_LINES => {
                config.max_log_lines = Config::validate_line_count(parse_number(value)?)
                    .map_err(LoadFailure::Rejected)?;
            }
            KEY_TAP_COUNT => {
                config.tap_count = Config::validate_tap_count(parse_number(value)?)
                    .map_err(LoadFailure::Rejected)?;
            }
            KEY_SENSITIVITY => {
                config.sensitivity = Config::validate_sensitivity(parse_number(value)?, profile)
                    .map_err(LoadFailure::Rejected)?;
            }
            other => debug!("config: ignoring key {}", other),
        }
    }
    Ok(config)
}

fn parse_number(value: &str) -> Result<i64, LoadFailure> {
    value.parse::<i64>().map_err(|_| LoadFailure::Malformed)
}
