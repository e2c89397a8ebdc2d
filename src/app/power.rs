use embassy_time::{Duration, Timer};
use esp_hal::{
    gpio::Input,
    peripherals::GPIO33,
    rtc_cntl::{
        sleep::{Ext0WakeupSource, WakeupLevel},
        wakeup_cause, Rtc, SleepSource,
    },
};
use log::info;
use traplogger::{config::MAINTENANCE_SESSION_MS, Monotonic, WakeCause, WakePin};

use super::board::{uptime_ms, SharedContext};

pub(crate) fn wake_cause() -> WakeCause {
    match wakeup_cause() {
        SleepSource::Ext0 => WakeCause::TriggerPin,
        SleepSource::Timer => WakeCause::Timer,
        SleepSource::Undefined => WakeCause::PowerOn,
        _ => WakeCause::Other,
    }
}

pub(crate) struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_ms(&mut self) -> u64 {
        uptime_ms()
    }
}

/// Wake line driven high by the trap mechanism.
pub(crate) struct ActiveHigh<'d>(pub(crate) Input<'d>);

impl WakePin for ActiveHigh<'_> {
    fn is_active(&mut self) -> bool {
        self.0.is_high()
    }
}

/// Deep sleep with the trap's wake line as the only ext0 source.
pub(crate) struct Sleeper {
    rtc: Rtc<'static>,
    wake_pin: GPIO33<'static>,
}

impl Sleeper {
    pub(crate) fn new(rtc: Rtc<'static>, wake_pin: GPIO33<'static>) -> Self {
        Self { rtc, wake_pin }
    }

    pub(crate) fn sleep_until_triggered(mut self) -> ! {
        info!("power: deep sleep until wake line goes high");
        let wake = Ext0WakeupSource::new(self.wake_pin.reborrow(), WakeupLevel::High);
        self.rtc.sleep_deep(&[&wake])
    }
}

/// Keeps the command transport open for one maintenance window, then sleeps.
/// The context lock is held across sleep entry so no command is cut short.
#[embassy_executor::task]
pub(crate) async fn maintenance_session_task(context: &'static SharedContext, sleeper: Sleeper) {
    info!("session: open for {} ms", MAINTENANCE_SESSION_MS);
    Timer::after(Duration::from_millis(MAINTENANCE_SESSION_MS)).await;
    let _trap = context.lock().await;
    info!("session: closed at {} ms", uptime_ms());
    sleeper.sleep_until_triggered()
}
