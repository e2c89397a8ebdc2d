#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
pub(crate) use knock::{knock_drain_task, knock_irq_task};

#[cfg(feature = "button-profile")]
pub(crate) use button::button_task;

#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
mod knock {
    use embassy_time::{Duration, Ticker};
    use esp_hal::gpio::Input;
    use log::warn;
    use traplogger::{
        config::{KNOCK_REFRACTORY_MS, TRIGGER_POLL_MS},
        KnockLatch,
    };

    use crate::app::board::{uptime_ms, SharedContext};

    static KNOCK_LATCH: KnockLatch = KnockLatch::new(KNOCK_REFRACTORY_MS);

    /// Feeds LIS3DH INT1 edges into the latch. Refractory filtering happens there.
    /// `CLICK_SRC` is read on every edge, suppressed ones included, so the
    /// latched line drops and the next click raises a fresh edge.
    #[embassy_executor::task]
    pub(crate) async fn knock_irq_task(mut int1: Input<'static>, context: &'static SharedContext) {
        loop {
            int1.wait_for_rising_edge().await;
            KNOCK_LATCH.signal(uptime_ms() as u32);
            if let Err(err) = context.lock().await.sensor_mut().clear_click() {
                warn!("knock: clearing click source failed: {}", err);
            }
        }
    }

    #[embassy_executor::task]
    pub(crate) async fn knock_drain_task(context: &'static SharedContext) {
        let mut ticker = Ticker::every(Duration::from_millis(TRIGGER_POLL_MS));
        loop {
            ticker.next().await;
            if !KNOCK_LATCH.take() {
                continue;
            }
            if let Err(err) = context.lock().await.record_trigger(uptime_ms()) {
                warn!("knock: event not logged: {}", err);
            }
        }
    }
}

#[cfg(feature = "button-profile")]
mod button {
    use embassy_time::{Duration, Ticker};
    use esp_hal::gpio::Input;
    use log::warn;
    use traplogger::{
        config::{DEBOUNCE_DELAY_MS, TRIGGER_POLL_MS},
        Level, TriggerDebouncer,
    };

    use crate::app::board::{uptime_ms, SharedContext};

    #[embassy_executor::task]
    pub(crate) async fn button_task(button: Input<'static>, context: &'static SharedContext) {
        let mut debouncer = TriggerDebouncer::new(Level::Low, DEBOUNCE_DELAY_MS);
        // A button held through boot is not a press.
        debouncer.reset(Level::from_high(button.is_high()), uptime_ms());
        let mut ticker = Ticker::every(Duration::from_millis(TRIGGER_POLL_MS));
        loop {
            ticker.next().await;
            let output = debouncer.poll(Level::from_high(button.is_high()), uptime_ms());
            let Some(press) = output.event else {
                continue;
            };
            let mut trap = context.lock().await;
            if let Err(err) = trap.record_trigger(press.at_ms) {
                warn!("button: event not logged: {}", err);
            }
        }
    }
}
