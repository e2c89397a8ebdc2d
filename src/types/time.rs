use core::fmt;

pub const RTC_TEMPLATE_LEN: usize = 19;

const RTC_TEMPLATE: &[u8; RTC_TEMPLATE_LEN] = b"dddd-dd-dd dd:dd:dd";
const MIN_YEAR: u16 = 2000;
const MAX_YEAR: u16 = 2099;
const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtcFormatError {
    Length,
    Separator,
    Digit,
    Range,
}

impl fmt::Display for RtcFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => f.write_str("expected 19 characters"),
            Self::Separator => f.write_str("separator out of place"),
            Self::Digit => f.write_str("non-digit in numeric field"),
            Self::Range => f.write_str("field out of range"),
        }
    }
}

impl DateTime {
    pub const MIN: Self = Self {
        year: MIN_YEAR,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year)
            || !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 59
        {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Parses `YYYY-MM-DD HH:MM:SS`, the `SET_RTC` payload.
    pub fn parse_rtc(text: &str) -> Result<Self, RtcFormatError> {
        let bytes = text.as_bytes();
        if bytes.len() != RTC_TEMPLATE_LEN {
            return Err(RtcFormatError::Length);
        }
        for (&byte, &shape) in bytes.iter().zip(RTC_TEMPLATE.iter()) {
            if shape == b'd' {
                if !byte.is_ascii_digit() {
                    return Err(RtcFormatError::Digit);
                }
            } else if byte != shape {
                return Err(RtcFormatError::Separator);
            }
        }

        let field = |start: usize, len: usize| {
            bytes[start..start + len]
                .iter()
                .fold(0u16, |acc, byte| acc * 10 + u16::from(byte - b'0'))
        };
        Self::new(
            field(0, 4),
            field(5, 2) as u8,
            field(8, 2) as u8,
            field(11, 2) as u8,
            field(14, 2) as u8,
            field(17, 2) as u8,
        )
        .ok_or(RtcFormatError::Range)
    }

    pub fn to_unix_seconds(self) -> u64 {
        let days = days_from_civil(
            i64::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        );
        let seconds_of_day = u64::from(self.hour) * 3_600
            + u64::from(self.minute) * 60
            + u64::from(self.second);
        days.max(0) as u64 * SECONDS_PER_DAY + seconds_of_day
    }

    pub fn from_unix_seconds(seconds: u64) -> Self {
        let days = (seconds / SECONDS_PER_DAY) as i64;
        let seconds_of_day = seconds % SECONDS_PER_DAY;
        let (year, month, day) = civil_from_days(days);
        Self {
            year: year.clamp(0, i64::from(u16::MAX)) as u16,
            month: month as u8,
            day: day as u8,
            hour: (seconds_of_day / 3_600) as u8,
            minute: ((seconds_of_day % 3_600) / 60) as u8,
            second: (seconds_of_day % 60) as u8,
        }
    }

    /// Day of week, 0 = Sunday.
    pub fn weekday(self) -> u8 {
        let days = days_from_civil(
            i64::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        );
        // 1970-01-01 was a Thursday.
        (days + 4).rem_euclid(7) as u8
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SyncPoint {
    unix_seconds: u64,
    synced_at_ms: u64,
}

/// Software wall clock, set from the RTC by `SYNC_TIME`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock {
    sync: Option<SyncPoint>,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self { sync: None }
    }

    pub fn sync(&mut self, now: DateTime, now_ms: u64) {
        self.sync = Some(SyncPoint {
            unix_seconds: now.to_unix_seconds(),
            synced_at_ms: now_ms,
        });
    }

    pub fn is_synced(&self) -> bool {
        self.sync.is_some()
    }

    pub fn now(&self, now_ms: u64) -> Option<DateTime> {
        let sync = self.sync?;
        let elapsed_s = now_ms.saturating_sub(sync.synced_at_ms) / 1_000;
        Some(DateTime::from_unix_seconds(
            sync.unix_seconds.saturating_add(elapsed_s),
        ))
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = if year >= 0 { year } else { year - 399 } / 400;
    let year_of_era = year - era * 400;
    let shifted_month = i64::from((month + 9) % 12);
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let days = days + 719_468;
    let era = if days >= 0 { days } else { days - 146_096 } / 146_097;
    let day_of_era = days - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * shifted_month + 2) / 5 + 1) as u32;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    } as u32;
    let year = year_of_era + era * 400;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

#[cfg(test)]
mod tests {
    use super::{DateTime, RtcFormatError, SystemClock};

    fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime::new(year, month, day, hour, minute, second).expect("valid date")
    }

    #[test]
    fn parses_rtc_template() {
        assert_eq!(
            DateTime::parse_rtc("2024-01-01 00:00:00"),
            Ok(at(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            DateTime::parse_rtc("2099-12-31 23:59:59"),
            Ok(at(2099, 12, 31, 23, 59, 59))
        );
    }

    #[test]
    fn rejects_malformed_rtc_payloads() {
        assert_eq!(
            DateTime::parse_rtc("2024-01-01 00:00"),
            Err(RtcFormatError::Length)
        );
        assert_eq!(
            DateTime::parse_rtc("2024-01-01T00:00:00"),
            Err(RtcFormatError::Separator)
        );
        assert_eq!(
            DateTime::parse_rtc("2024/01/01 00:00:00"),
            Err(RtcFormatError::Separator)
        );
        assert_eq!(
            DateTime::parse_rtc("2024-0a-01 00:00:00"),
            Err(RtcFormatError::Digit)
        );
        assert_eq!(
            DateTime::parse_rtc("2024-13-01 00:00:00"),
            Err(RtcFormatError::Range)
        );
        assert_eq!(
            DateTime::parse_rtc("2023-02-29 00:00:00"),
            Err(RtcFormatError::Range)
        );
        assert_eq!(
            DateTime::parse_rtc("2024-01-01 24:00:00"),
            Err(RtcFormatError::Range)
        );
        assert_eq!(
            DateTime::parse_rtc("1999-12-31 23:59:59"),
            Err(RtcFormatError::Range)
        );
    }

    #[test]
    fn accepts_leap_day() {
        assert!(DateTime::parse_rtc("2024-02-29 12:00:00").is_ok());
    }

    #[test]
    fn displays_in_template_shape() {
        let mut text = heapless::String::<32>::new();
        core::fmt::write(&mut text, format_args!("{}", at(2024, 3, 7, 5, 4, 9)))
            .expect("fits");
        assert_eq!(text.as_str(), "2024-03-07 05:04:09");
    }

    #[test]
    fn converts_unix_seconds_both_ways() {
        let new_year = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(new_year.to_unix_seconds(), 1_704_067_200);
        assert_eq!(DateTime::from_unix_seconds(1_704_067_200), new_year);

        let leap = at(2024, 2, 29, 23, 59, 59);
        assert_eq!(DateTime::from_unix_seconds(leap.to_unix_seconds()), leap);
    }

    #[test]
    fn computes_weekday() {
        assert_eq!(at(2024, 1, 1, 0, 0, 0).weekday(), 1);
        assert_eq!(at(2000, 1, 1, 0, 0, 0).weekday(), 6);
    }

    #[test]
    fn system_clock_advances_from_sync_point() {
        let mut clock = SystemClock::new();
        assert_eq!(clock.now(5_000), None);

        clock.sync(at(2024, 1, 1, 0, 0, 0), 10_000);
        assert!(clock.is_synced());
        assert_eq!(clock.now(10_999), Some(at(2024, 1, 1, 0, 0, 0)));
        assert_eq!(clock.now(71_000), Some(at(2024, 1, 1, 0, 1, 1)));
    }
}
