use core::cell::RefCell;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Instant;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_hal::{i2c::master::I2c, Blocking};
use esp_storage::FlashStorage;
use traplogger::{
    config::{VOLUME_SLOT_COUNT, VOLUME_SLOT_SIZE},
    drivers::Ds3231,
    FlashVolume, Profile, StorageError, TrapContext,
};

#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
use traplogger::drivers::Lis3dh;
#[cfg(any(feature = "button-profile", feature = "wake-profile"))]
use traplogger::NoSensor;

#[cfg(feature = "button-profile")]
pub(crate) const PROFILE: Profile = Profile::BUTTON;
#[cfg(feature = "wake-profile")]
pub(crate) const PROFILE: Profile = Profile::WAKE;
#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
pub(crate) const PROFILE: Profile = Profile::KNOCK;

pub(crate) type I2cBus = RefCell<I2c<'static, Blocking>>;
pub(crate) type SharedI2c = RefCellDevice<'static, I2c<'static, Blocking>>;
pub(crate) type BoardRtc = Ds3231<SharedI2c>;
#[cfg(not(any(feature = "button-profile", feature = "wake-profile")))]
pub(crate) type BoardSensor = Lis3dh<SharedI2c>;
#[cfg(any(feature = "button-profile", feature = "wake-profile"))]
pub(crate) type BoardSensor = NoSensor;
pub(crate) type BoardVolume = FlashVolume<FlashStorage<'static>>;
pub(crate) type BoardContext = TrapContext<BoardVolume, BoardRtc, BoardSensor>;
pub(crate) type SharedContext = Mutex<CriticalSectionRawMutex, BoardContext>;

/// Mounts the volume on the last slots of the on-chip flash.
pub(crate) fn mount_volume(
    flash_peripheral: esp_hal::peripherals::FLASH<'static>,
) -> Result<BoardVolume, StorageError> {
    let flash = FlashStorage::new(flash_peripheral).multicore_auto_park();
    let capacity = flash.capacity() as u32;
    let region = VOLUME_SLOT_SIZE * u32::from(VOLUME_SLOT_COUNT);
    let base = capacity.checked_sub(region).ok_or(StorageError::Flash)?;
    FlashVolume::mount(flash, base, VOLUME_SLOT_COUNT)
}

pub(crate) fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}
