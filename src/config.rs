pub const UART_BAUD: u32 = 115_200;
pub const COMMAND_LINE_MAX: usize = 160;
pub const RESPONSE_CHUNK_MAX: usize = 64;

pub const TRAP_NAME_MAX: usize = 32;
pub const DEFAULT_TRAP_NAME: &str = "Trap_Default";
pub const NOTE_TEXT_MAX: usize = 96;

pub const CONFIG_PATH: &str = "/config.txt";
pub const CONFIG_RECORD_MAX: usize = 160;
pub const LOG_SUFFIX: &str = "_logs.txt";
pub const LOG_PATH_MAX: usize = 48;
// Longest formatted entry: name, timestamp, "NOTE " + note text, temperature and separators.
pub const LOG_LINE_MAX: usize = 192;

pub const VOLUME_MAGIC: u32 = 0x4754_5254;
pub const VOLUME_VERSION: u8 = 1;
pub const VOLUME_HEADER_LEN: usize = 64;
pub const VOLUME_SLOT_SIZE: u32 = 8 * 1024;
// Config and log plus two spares so an atomic replace always finds a free slot.
pub const VOLUME_SLOT_COUNT: u8 = 4;
pub const LOG_FILE_MAX: usize = VOLUME_SLOT_SIZE as usize - VOLUME_HEADER_LEN;

pub const DEBOUNCE_DELAY_MS: u64 = 50;
pub const KNOCK_REFRACTORY_MS: u32 = 300;
pub const HOLD_THRESHOLD_MS: u64 = 1_000;
pub const MAINTENANCE_SESSION_MS: u64 = 120_000;
pub const TRIGGER_POLL_MS: u64 = 5;
