//! Collaborator seams between the core and the board.
//!
//! The core never touches peripherals directly. The firmware hands it values
//! implementing these traits; host tests hand it fakes.

use core::fmt;

use crate::{settings::TapCount, types::DateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtcError {
    Bus,
    InvalidTime,
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => f.write_str("rtc bus error"),
            Self::InvalidTime => f.write_str("rtc holds an invalid time"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorError {
    NotFound,
    Bus,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("trigger sensor not found"),
            Self::Bus => f.write_str("trigger sensor bus error"),
        }
    }
}

/// Battery-backed wall clock.
pub trait Rtc {
    fn now(&mut self) -> Result<DateTime, RtcError>;

    fn adjust(&mut self, time: DateTime) -> Result<(), RtcError>;

    fn temperature(&mut self) -> Option<f32> {
        None
    }
}

/// Hardware that decides what counts as a physical trigger.
pub trait TriggerSensor {
    fn configure_trigger(&mut self, tap_count: TapCount, sensitivity: u8) -> Result<(), SensorError>;
}

/// Variants whose trigger is a plain pin have nothing to program.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSensor;

impl TriggerSensor for NoSensor {
    fn configure_trigger(&mut self, _tap_count: TapCount, _sensitivity: u8) -> Result<(), SensorError> {
        Ok(())
    }
}

pub trait WakePin {
    fn is_active(&mut self) -> bool;
}

pub trait Monotonic {
    fn now_ms(&mut self) -> u64;
}
