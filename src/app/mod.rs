mod board;
#[cfg(feature = "wake-profile")]
mod power;
mod serial;
mod trigger;

use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;
use esp_hal::{
    i2c::master::{Config as I2cConfig, I2c, SoftwareTimeout},
    time::{Duration as HalDuration, Rate},
    timer::timg::TimerGroup,
    uart::{Config as UartConfig, Uart},
};
#[cfg(not(feature = "wake-profile"))]
use esp_hal::gpio::{Input, InputConfig, Pull};
use log::{error, info, warn, LevelFilter};
use static_cell::StaticCell;
use traplogger::{config::UART_BAUD, drivers::Ds3231, TrapContext};

use self::board::{BoardContext, BoardSensor, I2cBus, SharedContext, PROFILE};

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();
static CONTEXT: StaticCell<SharedContext> = StaticCell::new();

pub(crate) fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);
    esp_println::logger::init_logger(LevelFilter::Info);
    info!("boot: profile {:?}", PROFILE.trigger);

    let uart_cfg = UartConfig::default().with_baudrate(UART_BAUD);
    let uart = Uart::new(peripherals.UART0, uart_cfg)
        .expect("failed to init UART0")
        .with_rx(peripherals.GPIO3)
        .with_tx(peripherals.GPIO1)
        .into_async();

    let i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(100))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(40)));
    let i2c = I2c::new(peripherals.I2C0, i2c_cfg)
        .expect("failed to init I2C0")
        .with_sda(peripherals.GPIO21)
        .with_scl(peripherals.GPIO22);
    let bus: &'static I2cBus = I2C_BUS.init(RefCell::new(i2c));

    let volume = match board::mount_volume(peripherals.FLASH) {
        Ok(volume) => volume,
        Err(err) => {
            error!("boot: flash volume unavailable: {}", err);
            halt_forever();
        }
    };
    let mut rtc = Ds3231::new(RefCellDevice::new(bus));
    match rtc.lost_power() {
        Ok(true) => warn!("boot: RTC oscillator stopped, time needs SET_RTC"),
        Ok(false) => {}
        Err(err) => warn!("boot: RTC unreachable: {}", err),
    }
    let sensor = match probe_sensor(bus) {
        Some(sensor) => sensor,
        None => halt_forever(),
    };
    let trap: BoardContext = match TrapContext::boot(volume, rtc, sensor, PROFILE) {
        Ok(trap) => trap,
        Err(err) => {
            error!("{}", err);
            halt_forever();
        }
    };
    let context: &'static SharedContext = CONTEXT.init(SharedContext::new(trap));

    #[cfg(feature = "wake-profile")]
    let sleeper = {
        use esp_hal::{
            gpio::{Input, InputConfig, Pull},
            rtc_cntl::Rtc,
        };
        use traplogger::{classify_wake, config::HOLD_THRESHOLD_MS, WakeOutcome};

        let mut wake_line = peripherals.GPIO33;
        let outcome = {
            let input = Input::new(wake_line.reborrow(), InputConfig::default().with_pull(Pull::Down));
            let mut pin = power::ActiveHigh(input);
            classify_wake(power::wake_cause(), &mut pin, &mut power::EmbassyClock, HOLD_THRESHOLD_MS)
        };
        info!("boot: wake outcome {:?}", outcome);
        let sleeper = power::Sleeper::new(Rtc::new(peripherals.LPWR), wake_line);
        if let WakeOutcome::TrapActivation { .. } = outcome {
            // The executor never starts on this path; the context is still unshared.
            match context.try_lock() {
                Ok(mut trap) => {
                    if let Err(err) = trap.record_trigger(board::uptime_ms()) {
                        error!("boot: activation not logged: {}", err);
                    }
                }
                Err(_) => error!("boot: context busy, activation not logged"),
            }
            sleeper.sleep_until_triggered();
        }
        sleeper
    };

    #[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
    let knock_int = Input::new(peripherals.GPIO34, InputConfig::default().with_pull(Pull::None));
    #[cfg(feature = "button-profile")]
    let button = Input::new(peripherals.GPIO32, InputConfig::default().with_pull(Pull::Up));

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(serial::command_task(uart, context));
        #[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
        {
            spawner.must_spawn(trigger::knock_irq_task(knock_int, context));
            spawner.must_spawn(trigger::knock_drain_task(context));
        }
        #[cfg(feature = "button-profile")]
        spawner.must_spawn(trigger::button_task(button, context));
        #[cfg(feature = "wake-profile")]
        spawner.must_spawn(power::maintenance_session_task(context, sleeper));
    });
}

#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
fn probe_sensor(bus: &'static I2cBus) -> Option<BoardSensor> {
    use traplogger::drivers::{
        lis3dh::{LIS3DH_ADDR, LIS3DH_ADDR_ALT},
        Lis3dh,
    };

    for address in [LIS3DH_ADDR, LIS3DH_ADDR_ALT] {
        match Lis3dh::new(RefCellDevice::new(bus), address) {
            Ok(sensor) => {
                info!("boot: LIS3DH at {:#04x}", address);
                return Some(sensor);
            }
            Err(err) => info!("boot: no LIS3DH at {:#04x}: {}", address, err),
        }
    }
    error!("boot: accelerometer not found, halting");
    None
}

#[cfg(any(feature = "button-profile", feature = "wake-profile"))]
fn probe_sensor(_bus: &'static I2cBus) -> Option<BoardSensor> {
    Some(traplogger::NoSensor)
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
