use core::fmt::{self, Write};

use log::{info, warn};

use super::{
    commands::Command,
    responses::{self, line, line_fmt},
};
use crate::{
    context::TrapContext,
    event_log::{EventLog, LogMessage},
    ports::{Rtc, TriggerSensor},
    settings::{Config, ConfigError},
    storage::Volume,
};

impl<V, R, S> TrapContext<V, R, S>
where
    V: Volume,
    R: Rtc,
    S: TriggerSensor,
{
    /// Runs `command` to completion, storage included, and writes its one response.
    /// Every failure becomes a response line; nothing here aborts the session.
    pub fn dispatch<W: Write>(&mut self, command: Command<'_>, now_ms: u64, out: &mut W) -> fmt::Result {
        match command {
            Command::Help => {
                for text in responses::HELP_LINES {
                    line(out, text)?;
                }
                Ok(())
            }
            Command::ShowLogs => self.show_logs(out),
            Command::ClearLogs => match EventLog::clear(&mut self.volume, &self.config.trap_name) {
                Ok(()) => line(out, responses::LOGS_CLEARED),
                Err(err) => {
                    warn!("cmd: clear failed: {}", err);
                    line(out, responses::ERR_CLEAR_LOGS)
                }
            },
            Command::SyncTime => match self.rtc.now() {
                Ok(now) => {
                    self.system_clock.sync(now, now_ms);
                    line(out, responses::TIME_SYNCED)
                }
                Err(err) => {
                    warn!("cmd: rtc read failed: {}", err);
                    line(out, responses::ERR_RTC_UNAVAILABLE)
                }
            },
            Command::SetRtc(Ok(time)) => match self.rtc.adjust(time) {
                Ok(()) => {
                    info!("rtc: set to {}", time);
                    line(out, responses::RTC_UPDATED)
                }
                Err(err) => {
                    warn!("cmd: rtc adjust failed: {}", err);
                    line(out, responses::ERR_RTC_UNAVAILABLE)
                }
            },
            Command::SetRtc(Err(_)) => line(out, responses::ERR_RTC_FORMAT),
            Command::ReadTime => match self.rtc.now() {
                Ok(now) => line_fmt(out, format_args!("RTC Time: {}", now)),
                Err(err) => {
                    warn!("cmd: rtc read failed: {}", err);
                    line(out, responses::ERR_RTC_UNAVAILABLE)
                }
            },
            Command::SetName(name) => self.set_name(name, out),
            Command::SetLineCount(value) => match Config::validate_line_count(value) {
                Ok(lines) => {
                    self.config.max_log_lines = lines;
                    self.persist_then(out, format_args!("Line count set to: {}", lines))
                }
                Err(err) => reject(out, err),
            },
            Command::AddNote("") => line(out, responses::ERR_NOTE_REQUIRED),
            Command::AddNote(text) if text.chars().any(char::is_control) => {
                line(out, responses::ERR_NOTE_CONTROL)
            }
            Command::AddNote(text) => match self.record_event(LogMessage::note(text), now_ms) {
                Ok(()) => line(out, responses::NOTE_ADDED),
                Err(_) => line(out, responses::ERR_WRITE_LOG),
            },
            Command::ShowConfig => self.show_config(out),
            Command::SetTap(value) => match Config::validate_tap_count(value) {
                Ok(tap_count) => {
                    self.config.tap_count = tap_count;
                    self.rearm_sensor();
                    self.persist_then(out, format_args!("Tap count set to: {}", tap_count.as_u8()))
                }
                Err(err) => reject(out, err),
            },
            Command::SetSensitivity(value) => {
                match Config::validate_sensitivity(value, &self.profile) {
                    Ok(sensitivity) => {
                        self.config.sensitivity = sensitivity;
                        self.rearm_sensor();
                        self.persist_then(out, format_args!("Sensitivity set to: {}", sensitivity))
                    }
                    Err(err) => reject(out, err),
                }
            }
            Command::Unknown => line(out, responses::UNKNOWN_COMMAND),
        }
    }

    fn show_logs<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        let lines = match EventLog::read_all(&mut self.volume, &self.config.trap_name) {
            Ok(Some(lines)) => lines,
            Ok(None) => return line(out, responses::NO_LOGS),
            Err(err) => {
                warn!("cmd: log read failed: {}", err);
                return line(out, responses::ERR_READ_LOGS);
            }
        };
        for entry in lines {
            match entry {
                Ok(text) => line(out, &text)?,
                Err(err) => {
                    warn!("cmd: log read failed mid-stream: {}", err);
                    return line(out, responses::ERR_READ_LOGS);
                }
            }
        }
        Ok(())
    }

    fn set_name<W: Write>(&mut self, name: &str, out: &mut W) -> fmt::Result {
        let trap_name = match Config::validate_name(name) {
            Ok(trap_name) => trap_name,
            Err(err) => return reject(out, err),
        };
        if let Err(err) = EventLog::rebind(&mut self.volume, &self.config.trap_name) {
            warn!("cmd: dropping old log failed: {}", err);
            return line(out, responses::ERR_CLEAR_LOGS);
        }
        info!("cmd: trap renamed {} -> {}", self.config.trap_name, trap_name);
        self.config.trap_name = trap_name;
        let confirmed = self.config.trap_name.clone();
        self.persist_then(out, format_args!("Trap name set to: {}", confirmed))
    }

    fn show_config<W: Write>(&mut self, out: &mut W) -> fmt::Result {
        line_fmt(out, format_args!("Trap Name: {}", self.config.trap_name))?;
        line_fmt(out, format_args!("Max Log Lines: {}", self.config.max_log_lines))?;
        line_fmt(out, format_args!("Tap Count: {}", self.config.tap_count.as_u8()))?;
        line_fmt(
            out,
            format_args!(
                "Sensitivity: {} (1-{})",
                self.config.sensitivity, self.profile.sensitivity_max
            ),
        )?;
        match self.rtc.now() {
            Ok(now) => line_fmt(out, format_args!("RTC Time: {}", now))?,
            Err(_) => line(out, "RTC Time: unavailable")?,
        }
        match self.rtc.temperature() {
            Some(celsius) => line_fmt(out, format_args!("Temperature: {:.2}C", celsius)),
            None => line(out, "Temperature: unavailable"),
        }
    }

    /// Persists the config, then confirms with `ok` or reports the save failure.
    /// The in-memory value stays applied either way.
    fn persist_then<W: Write>(&mut self, out: &mut W, ok: fmt::Arguments<'_>) -> fmt::Result {
        match self.persist() {
            Ok(()) => line_fmt(out, ok),
            Err(_) => line(out, responses::ERR_SAVE_CONFIG),
        }
    }
}

fn reject<W: Write>(out: &mut W, err: ConfigError) -> fmt::Result {
    line_fmt(out, format_args!("Error: {}", err))
}
