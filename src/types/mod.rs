mod time;

pub use time::{DateTime, RtcFormatError, SystemClock, RTC_TEMPLATE_LEN};
