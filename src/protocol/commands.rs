use crate::types::{DateTime, RtcFormatError};

/// One parsed request line. Arguments borrow from the line they came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    ShowLogs,
    ClearLogs,
    SyncTime,
    SetRtc(Result<DateTime, RtcFormatError>),
    ReadTime,
    SetName(&'a str),
    SetLineCount(i64),
    AddNote(&'a str),
    ShowConfig,
    SetTap(i64),
    SetSensitivity(i64),
    Unknown,
}

impl Command<'_> {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Help => "HELP",
            Self::ShowLogs => "SHOW_LOGS",
            Self::ClearLogs => "CLEAR_LOGS",
            Self::SyncTime => "SYNC_TIME",
            Self::SetRtc(_) => "SET_RTC",
            Self::ReadTime => "READ_TIME",
            Self::SetName(_) => "SET_NAME",
            Self::SetLineCount(_) => "SET_LINE_COUNT",
            Self::AddNote(_) => "ADD_NOTE",
            Self::ShowConfig => "SHOW_CONFIG",
            Self::SetTap(_) => "SET_TAP",
            Self::SetSensitivity(_) => "SET_SENSITIVITY",
            Self::Unknown => "UNKNOWN",
        }
    }
}
