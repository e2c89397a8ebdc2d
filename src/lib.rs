//! Trap logger core.
//!
//! Everything here is hardware-agnostic and builds on the host: the debounced
//! trigger classifier, the bounded event log, the persisted configuration and
//! the line-oriented command dispatcher. The ESP32 firmware in `src/main.rs`
//! plugs flash, I2C peripherals and the UART transport into these pieces.
//!
//! ```text
//! trigger pin / INT1 ─► classifier ─► TrapContext::record_event ─► EventLog ─► Volume
//! transport line     ─► LineReader ─► parse_command ─► TrapContext::dispatch
//!                                                      │   ├─► ConfigStore ─► Volume
//!                                                      │   ├─► Rtc / SystemClock
//!                                                      │   └─► TriggerSensor
//!                                                      └─► response (fmt::Write)
//! ```

#![cfg_attr(not(test), no_std)]

pub mod classifier;
pub mod config;
pub mod context;
pub mod drivers;
pub mod event_log;
pub mod ports;
pub mod profile;
pub mod protocol;
pub mod settings;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{classify_wake, KnockLatch, Level, TriggerDebouncer, WakeCause, WakeOutcome};
pub use context::{BootError, TrapContext};
pub use event_log::{log_identity, EventLog, LogEntry, LogMessage};
pub use ports::{Monotonic, NoSensor, Rtc, RtcError, SensorError, TriggerSensor, WakePin};
pub use profile::{Profile, TriggerShape};
pub use protocol::{parse_command, ChunkedWriter, Command, LineReadEvent, LineReader};
pub use settings::{Config, ConfigError, ConfigStore, TapCount};
pub use storage::{FlashVolume, MemFlash, StorageError, Volume};
pub use types::{DateTime, RtcFormatError, SystemClock};
