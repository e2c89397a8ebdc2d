use crate::{
    config::{VOLUME_SLOT_COUNT, VOLUME_SLOT_SIZE},
    ports::{Rtc, RtcError, SensorError, TriggerSensor},
    settings::TapCount,
    storage::{FlashVolume, MemFlash, Volume},
    types::DateTime,
};

pub(crate) const REGION: usize = VOLUME_SLOT_SIZE as usize * VOLUME_SLOT_COUNT as usize;

pub(crate) fn backing() -> Vec<u8> {
    vec![0xFFu8; REGION]
}

pub(crate) fn mount(backing: &mut [u8]) -> FlashVolume<MemFlash<'_>> {
    FlashVolume::mount(MemFlash::new(backing), 0, VOLUME_SLOT_COUNT).expect("mount")
}

pub(crate) fn file_text<V: Volume>(volume: &mut V, path: &str) -> Option<String> {
    let len = volume.len(path).expect("len")?;
    let mut out = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        filled += volume.read(path, filled, &mut out[filled..]).expect("read");
    }
    Some(String::from_utf8(out).expect("utf8"))
}

pub(crate) fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
    DateTime::new(year, month, day, hour, minute, second).expect("valid date")
}

pub(crate) struct FakeRtc {
    pub(crate) now: Option<DateTime>,
    pub(crate) temperature: Option<f32>,
    pub(crate) adjusted: Vec<DateTime>,
}

impl FakeRtc {
    pub(crate) fn at(now: DateTime) -> Self {
        Self {
            now: Some(now),
            temperature: None,
            adjusted: Vec::new(),
        }
    }

    pub(crate) fn broken() -> Self {
        Self {
            now: None,
            temperature: None,
            adjusted: Vec::new(),
        }
    }
}

impl Rtc for FakeRtc {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        self.now.ok_or(RtcError::Bus)
    }

    fn adjust(&mut self, time: DateTime) -> Result<(), RtcError> {
        if self.now.is_none() {
            return Err(RtcError::Bus);
        }
        self.now = Some(time);
        self.adjusted.push(time);
        Ok(())
    }

    fn temperature(&mut self) -> Option<f32> {
        self.temperature
    }
}

#[derive(Default)]
pub(crate) struct FakeSensor {
    pub(crate) applied: Vec<(TapCount, u8)>,
    pub(crate) fail: Option<SensorError>,
}

impl TriggerSensor for FakeSensor {
    fn configure_trigger(&mut self, tap_count: TapCount, sensitivity: u8) -> Result<(), SensorError> {
        if let Some(err) = self.fail {
            return Err(err);
        }
        self.applied.push((tap_count, sensitivity));
        Ok(())
    }
}
