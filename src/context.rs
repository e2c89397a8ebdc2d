use core::fmt;

use log::{info, warn};

use crate::{
    event_log::{EventLog, LogEntry, LogMessage},
    ports::{Rtc, SensorError, TriggerSensor},
    profile::Profile,
    protocol::parse_command,
    settings::{Config, ConfigStore},
    storage::{StorageError, Volume},
    types::{DateTime, SystemClock},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootError {
    Sensor(SensorError),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(err) => write!(f, "boot halted: {}", err),
        }
    }
}

/// Everything the trap needs at run time, owned in one place and handed to
/// whichever task currently holds it.
pub struct TrapContext<V, R, S> {
    pub(crate) volume: V,
    pub(crate) rtc: R,
    pub(crate) sensor: S,
    pub(crate) profile: Profile,
    pub(crate) config: Config,
    pub(crate) log: EventLog,
    pub(crate) system_clock: SystemClock,
}

impl<V, R, S> TrapContext<V, R, S>
where
    V: Volume,
    R: Rtc,
    S: TriggerSensor,
{
    /// Loads the config (healing it if needed) and arms the trigger sensor.
    /// Only a sensor that cannot be programmed stops the boot.
    pub fn boot(mut volume: V, rtc: R, mut sensor: S, profile: Profile) -> Result<Self, BootError> {
        let config = ConfigStore::load(&mut volume, &profile);
        sensor
            .configure_trigger(config.tap_count, config.sensitivity)
            .map_err(BootError::Sensor)?;
        info!(
            "boot: trap={} lines={} tap={} sensitivity={}",
            config.trap_name,
            config.max_log_lines,
            config.tap_count.as_u8(),
            config.sensitivity
        );
        Ok(Self {
            volume,
            rtc,
            sensor,
            profile,
            config,
            log: EventLog::new(),
            system_clock: SystemClock::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn volume_mut(&mut self) -> &mut V {
        &mut self.volume
    }

    pub fn rtc_mut(&mut self) -> &mut R {
        &mut self.rtc
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Parses one framed line and answers it on `out`.
    pub fn handle_line<W: fmt::Write>(&mut self, line: &str, now_ms: u64, out: &mut W) -> fmt::Result {
        let command = parse_command(line);
        info!("cmd: {}", command.label());
        self.dispatch(command, now_ms, out)
    }

    /// The variant's own trigger message, stamped and appended.
    pub fn record_trigger(&mut self, now_ms: u64) -> Result<(), StorageError> {
        self.record_event(self.profile.event_message(), now_ms)
    }

    /// Stamps `message` with the RTC and appends it under the current trap name.
    pub fn record_event(&mut self, message: LogMessage<'_>, now_ms: u64) -> Result<(), StorageError> {
        let timestamp = self.timestamp(now_ms);
        let entry = LogEntry {
            trap_name: self.config.trap_name.as_str(),
            timestamp,
            message,
            temperature: self.rtc.temperature(),
        };
        self.log
            .append(&mut self.volume, &entry, self.config.max_log_lines)?;
        info!("event: {}", entry);
        Ok(())
    }

    fn timestamp(&mut self, now_ms: u64) -> DateTime {
        match self.rtc.now() {
            Ok(now) => now,
            Err(err) => {
                warn!("event: {}, falling back to system clock", err);
                self.system_clock.now(now_ms).unwrap_or(DateTime::MIN)
            }
        }
    }

    pub(crate) fn persist(&mut self) -> Result<(), StorageError> {
        ConfigStore::save(&mut self.volume, &self.config).inspect_err(|err| {
            warn!("config: save failed: {}", err);
        })
    }

    pub(crate) fn rearm_sensor(&mut self) {
        if let Err(err) = self
            .sensor
            .configure_trigger(self.config.tap_count, self.config.sensitivity)
        {
            warn!("sensor: re-arm failed: {}", err);
        }
    }
}
