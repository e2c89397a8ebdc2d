use super::commands::Command;
use crate::types::DateTime;

#[derive(Clone, Copy)]
enum Keyword {
    Help,
    ShowLogs,
    ClearLogs,
    SyncTime,
    SetRtc,
    ReadTime,
    SetName,
    SetLineCount,
    AddNote,
    ShowConfig,
    SetTap,
    SetSensitivity,
}

impl Keyword {
    const fn takes_argument(self) -> bool {
        matches!(
            self,
            Self::SetRtc
                | Self::SetName
                | Self::SetLineCount
                | Self::AddNote
                | Self::SetTap
                | Self::SetSensitivity
        )
    }
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("HELP", Keyword::Help),
    ("SHOW_LOGS", Keyword::ShowLogs),
    ("CLEAR_LOGS", Keyword::ClearLogs),
    ("SYNC_TIME", Keyword::SyncTime),
    ("SET_RTC", Keyword::SetRtc),
    ("READ_TIME", Keyword::ReadTime),
    ("SET_NAME", Keyword::SetName),
    ("SET_LINE_COUNT", Keyword::SetLineCount),
    ("ADD_NOTE", Keyword::AddNote),
    ("CURRENT_CONFIG", Keyword::ShowConfig),
    ("SHOW_CONFIG", Keyword::ShowConfig),
    ("SET_TAP", Keyword::SetTap),
    ("SET_SENSITIVITY", Keyword::SetSensitivity),
];

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (word, argument) = match line.split_once(' ') {
        Some((word, rest)) => (word, Some(rest.trim())),
        None => (line, None),
    };

    let Some(keyword) = KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, keyword)| *keyword)
    else {
        return Command::Unknown;
    };

    if !keyword.takes_argument() {
        return match argument {
            Some(_) => Command::Unknown,
            None => bare_command(keyword),
        };
    }

    let argument = argument.unwrap_or("");
    match keyword {
        Keyword::SetRtc => Command::SetRtc(DateTime::parse_rtc(argument)),
        Keyword::SetName => Command::SetName(argument),
        Keyword::SetLineCount => Command::SetLineCount(parse_lenient_int(argument)),
        Keyword::AddNote => Command::AddNote(argument),
        Keyword::SetTap => Command::SetTap(parse_lenient_int(argument)),
        Keyword::SetSensitivity => Command::SetSensitivity(parse_lenient_int(argument)),
        _ => bare_command(keyword),
    }
}

fn bare_command(keyword: Keyword) -> Command<'static> {
    match keyword {
        Keyword::Help => Command::Help,
        Keyword::ShowLogs => Command::ShowLogs,
        Keyword::ClearLogs => Command::ClearLogs,
        Keyword::SyncTime => Command::SyncTime,
        Keyword::ReadTime => Command::ReadTime,
        Keyword::ShowConfig => Command::ShowConfig,
        _ => Command::Unknown,
    }
}

/// Optional sign then leading digits; anything else yields 0, as does overflow.
pub(crate) fn parse_lenient_int(text: &str) -> i64 {
    let bytes = text.trim().as_bytes();
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &byte in digits.iter().take_while(|byte| byte.is_ascii_digit()) {
        value = match value
            .checked_mul(10)
            .and_then(|acc| acc.checked_add(i64::from(byte - b'0')))
        {
            Some(next) => next,
            None => return 0,
        };
    }
    if negative {
        -value
    } else {
        value
    }
}
