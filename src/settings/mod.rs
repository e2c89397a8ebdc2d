mod store;

use core::fmt;

pub use store::ConfigStore;

use crate::{
    config::{DEFAULT_TRAP_NAME, TRAP_NAME_MAX},
    profile::Profile,
};

pub type TrapName = heapless::String<TRAP_NAME_MAX>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapCount {
    Single,
    Double,
}

impl TapCount {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NameEmpty,
    NameTooLong,
    NameHasControl,
    LineCountNotPositive,
    LineCountTooLarge,
    TapCountOutOfRange,
    SensitivityOutOfRange { max: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameEmpty => f.write_str("Trap name cannot be empty."),
            Self::NameTooLong => write!(f, "Trap name too long (max {}).", TRAP_NAME_MAX),
            Self::NameHasControl => f.write_str("Trap name cannot contain control characters."),
            Self::LineCountNotPositive => f.write_str("Line count must be positive."),
            Self::LineCountTooLarge => write!(f, "Line count too large (max {}).", u32::MAX),
            Self::TapCountOutOfRange => f.write_str("Tap count must be 1 or 2."),
            Self::SensitivityOutOfRange { max } => {
                write!(f, "Sensitivity must be between 1 and {}.", max)
            }
        }
    }
}

/// Runtime tunables, loaded once at boot and written through on every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub trap_name: TrapName,
    pub max_log_lines: u32,
    pub tap_count: TapCount,
    pub sensitivity: u8,
}

impl Config {
    pub fn defaults(profile: &Profile) -> Self {
        let mut trap_name = TrapName::new();
        let _ = trap_name.push_str(DEFAULT_TRAP_NAME);
        Self {
            trap_name,
            max_log_lines: profile.default_max_log_lines,
            tap_count: profile.default_tap_count,
            sensitivity: profile.default_sensitivity,
        }
    }

    pub fn validate_name(name: &str) -> Result<TrapName, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::NameEmpty);
        }
        // The name lands in the config file and in every log line.
        if name.chars().any(char::is_control) {
            return Err(ConfigError::NameHasControl);
        }
        let mut trap_name = TrapName::new();
        trap_name
            .push_str(name)
            .map_err(|_| ConfigError::NameTooLong)?;
        Ok(trap_name)
    }

    pub fn validate_line_count(value: i64) -> Result<u32, ConfigError> {
        if value <= 0 {
            return Err(ConfigError::LineCountNotPositive);
        }
        u32::try_from(value).map_err(|_| ConfigError::LineCountTooLarge)
    }

    pub fn validate_tap_count(value: i64) -> Result<TapCount, ConfigError> {
        u8::try_from(value)
            .ok()
            .and_then(TapCount::from_u8)
            .ok_or(ConfigError::TapCountOutOfRange)
    }

    pub fn validate_sensitivity(value: i64, profile: &Profile) -> Result<u8, ConfigError> {
        let max = profile.sensitivity_max;
        match u8::try_from(value) {
            Ok(sensitivity) if (1..=max).contains(&sensitivity) => Ok(sensitivity),
            _ => Err(ConfigError::SensitivityOutOfRange { max }),
        }
    }
}
