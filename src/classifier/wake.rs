use crate::ports::{Monotonic, WakePin};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeCause {
    PowerOn,
    TriggerPin,
    Timer,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeOutcome {
    ColdBoot,
    /// Pin held past the threshold: open a maintenance session.
    Maintenance { held_ms: u64 },
    /// Pin released early: log one activation and go back to sleep.
    TrapActivation { held_ms: u64 },
}

/// Blocks while the wake pin stays active, for at most `threshold_ms`.
pub fn classify_wake<P, M>(cause: WakeCause, pin: &mut P, clock: &mut M, threshold_ms: u64) -> WakeOutcome
where
    P: WakePin,
    M: Monotonic,
{
    if cause != WakeCause::TriggerPin {
        return WakeOutcome::ColdBoot;
    }
    let started_ms = clock.now_ms();
    loop {
        let held_ms = clock.now_ms().saturating_sub(started_ms);
        if held_ms >= threshold_ms {
            return WakeOutcome::Maintenance { held_ms };
        }
        if !pin.is_active() {
            return WakeOutcome::TrapActivation { held_ms };
        }
        core::hint::spin_loop();
    }
}
