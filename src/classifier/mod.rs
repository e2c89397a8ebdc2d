//! Turning raw pin levels into trap events.
//!
//! Three front ends share one rule: ambiguity is resolved silently. Bounce is
//! absorbed by `TriggerDebouncer`, knock storms by the `KnockLatch` refractory
//! window and wake-pin glitches by the hold threshold in `classify_wake`.

mod debounce;
mod latch;
mod wake;

pub use debounce::{DebounceOutput, DebounceStateId, TriggerDebouncer, TriggerEvent};
pub use latch::KnockLatch;
pub use wake::{classify_wake, WakeCause, WakeOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub const fn from_high(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }

    pub const fn inverse(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}
