use core::fmt::{self, Write};

pub(super) const HELP_LINES: &[&str] = &[
    "Available commands:",
    "HELP - Show this help",
    "SHOW_LOGS - Print all stored log lines",
    "CLEAR_LOGS - Delete the log",
    "SYNC_TIME - Set the system clock from the RTC",
    "SET_RTC YYYY-MM-DD HH:MM:SS - Set the RTC",
    "READ_TIME - Print the RTC time",
    "SET_NAME <name> - Rename the trap (clears its log)",
    "SET_LINE_COUNT <n> - Keep at most n log lines",
    "ADD_NOTE <text> - Append a note to the log",
    "SHOW_CONFIG | CURRENT_CONFIG - Print the configuration",
    "SET_TAP <1|2> - Single or double tap trigger",
    "SET_SENSITIVITY <n> - Tap threshold",
];

pub(super) const LOGS_CLEARED: &str = "Logs cleared.";
pub(super) const NO_LOGS: &str = "No logs found.";
pub(super) const TIME_SYNCED: &str = "System time synced with RTC.";
pub(super) const RTC_UPDATED: &str = "RTC updated.";
pub(super) const NOTE_ADDED: &str = "Note added.";
pub(super) const UNKNOWN_COMMAND: &str = "Unknown command. Type HELP for a list of commands.";

pub(super) const ERR_RTC_FORMAT: &str = "Error: Invalid format. Use SET_RTC YYYY-MM-DD HH:MM:SS";
pub(super) const ERR_NOTE_REQUIRED: &str = "Error: Note message required.";
pub(super) const ERR_NOTE_CONTROL: &str = "Error: Note cannot contain control characters.";
pub(super) const ERR_SAVE_CONFIG: &str = "Error: Failed to save config.";
pub(super) const ERR_WRITE_LOG: &str = "Error: Failed to write log.";
pub(super) const ERR_READ_LOGS: &str = "Error: Failed to read logs.";
pub(super) const ERR_CLEAR_LOGS: &str = "Error: Failed to clear logs.";
pub(super) const ERR_RTC_UNAVAILABLE: &str = "Error: RTC unavailable.";

pub const ERR_LINE_TOO_LONG: &str = "Error: Command too long.";

pub(super) fn line<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_str(text)?;
    out.write_str("\r\n")
}

pub(super) fn line_fmt<W: Write>(out: &mut W, args: fmt::Arguments<'_>) -> fmt::Result {
    out.write_fmt(args)?;
    out.write_str("\r\n")
}
