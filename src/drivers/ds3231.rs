use embedded_hal::i2c::I2c;

use crate::{
    ports::{Rtc, RtcError},
    types::DateTime,
};

pub const DS3231_ADDR: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const REG_STATUS: u8 = 0x0F;
const REG_TEMP_MSB: u8 = 0x11;

const STATUS_OSF: u8 = 0x80;
const HOUR_12H_MODE: u8 = 0x40;
const HOUR_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;

/// Maxim DS3231 battery-backed RTC with its on-die temperature sensor.
pub struct Ds3231<I> {
    i2c: I,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    /// The oscillator stopped at some point, so the stored time is not trustworthy.
    pub fn lost_power(&mut self) -> Result<bool, RtcError> {
        Ok(self.read_reg(REG_STATUS)? & STATUS_OSF != 0)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, RtcError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(DS3231_ADDR, &[reg], &mut value)
            .map_err(|_| RtcError::Bus)?;
        Ok(value[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), RtcError> {
        self.i2c
            .write(DS3231_ADDR, &[reg, value])
            .map_err(|_| RtcError::Bus)
    }
}

impl<I: I2c> Rtc for Ds3231<I> {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        let mut raw = [0u8; 7];
        self.i2c
            .write_read(DS3231_ADDR, &[REG_SECONDS], &mut raw)
            .map_err(|_| RtcError::Bus)?;

        DateTime::new(
            2000 + u16::from(bcd_to_bin(raw[6])),
            bcd_to_bin(raw[5] & !MONTH_CENTURY),
            bcd_to_bin(raw[4] & 0x3F),
            decode_hour(raw[2]),
            bcd_to_bin(raw[1] & 0x7F),
            bcd_to_bin(raw[0] & 0x7F),
        )
        .ok_or(RtcError::InvalidTime)
    }

    fn adjust(&mut self, time: DateTime) -> Result<(), RtcError> {
        let year = time.year.checked_sub(2000).ok_or(RtcError::InvalidTime)?;
        if year > 99 {
            return Err(RtcError::InvalidTime);
        }
        let frame = [
            REG_SECONDS,
            bin_to_bcd(time.second),
            bin_to_bcd(time.minute),
            bin_to_bcd(time.hour),
            time.weekday() + 1,
            bin_to_bcd(time.day),
            bin_to_bcd(time.month),
            bin_to_bcd(year as u8),
        ];
        self.i2c
            .write(DS3231_ADDR, &frame)
            .map_err(|_| RtcError::Bus)?;

        let status = self.read_reg(REG_STATUS)?;
        self.write_reg(REG_STATUS, status & !STATUS_OSF)
    }

    fn temperature(&mut self) -> Option<f32> {
        let mut raw = [0u8; 2];
        self.i2c
            .write_read(DS3231_ADDR, &[REG_TEMP_MSB], &mut raw)
            .ok()?;
        Some(f32::from(raw[0] as i8) + f32::from(raw[1] >> 6) * 0.25)
    }
}

fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

fn decode_hour(raw: u8) -> u8 {
    if raw & HOUR_12H_MODE == 0 {
        return bcd_to_bin(raw & 0x3F);
    }
    let hour = bcd_to_bin(raw & 0x1F) % 12;
    if raw & HOUR_PM != 0 {
        hour + 12
    } else {
        hour
    }
}
