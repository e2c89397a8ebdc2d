use embedded_hal::i2c::I2c;
use log::info;

use crate::{
    ports::{SensorError, TriggerSensor},
    settings::TapCount,
};

pub const LIS3DH_ADDR: u8 = 0x18;
pub const LIS3DH_ADDR_ALT: u8 = 0x19;

const REG_WHO_AM_I: u8 = 0x0F;
const REG_CTRL1: u8 = 0x20;
const REG_CTRL3: u8 = 0x22;
const REG_CTRL4: u8 = 0x23;
const REG_CLICK_CFG: u8 = 0x38;
const REG_CLICK_SRC: u8 = 0x39;
const REG_CLICK_THS: u8 = 0x3A;
const REG_TIME_LIMIT: u8 = 0x3B;
const REG_TIME_LATENCY: u8 = 0x3C;
const REG_TIME_WINDOW: u8 = 0x3D;

const WHO_AM_I_VALUE: u8 = 0x33;
// 400 Hz, X/Y/Z enabled.
const CTRL1_ODR_400HZ_XYZ: u8 = 0x77;
// Block data update, high resolution, ±2 g.
const CTRL4_BDU_HR: u8 = 0x88;
const CTRL3_I1_CLICK: u8 = 0x80;
const CLICK_CFG_SINGLE_XYZ: u8 = 0x15;
const CLICK_CFG_DOUBLE_XYZ: u8 = 0x2A;
const CLICK_THS_MASK: u8 = 0x7F;
// LIR_Click: INT1 holds until CLICK_SRC is read.
const CLICK_THS_LIR: u8 = 0x80;

const CLICK_TIME_LIMIT: u8 = 10;
const CLICK_TIME_LATENCY: u8 = 20;
const CLICK_TIME_WINDOW: u8 = 255;

/// ST LIS3DH accelerometer used as a knock detector through its click engine.
pub struct Lis3dh<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Lis3dh<I> {
    /// Probes `WHO_AM_I` and sets the sample rate. A silent or foreign chip is
    /// `SensorError::NotFound`.
    pub fn new(i2c: I, address: u8) -> Result<Self, SensorError> {
        let mut sensor = Self { i2c, address };
        let who_am_i = sensor.read_reg(REG_WHO_AM_I).map_err(|_| SensorError::NotFound)?;
        if who_am_i != WHO_AM_I_VALUE {
            return Err(SensorError::NotFound);
        }
        sensor.write_reg(REG_CTRL1, CTRL1_ODR_400HZ_XYZ)?;
        sensor.write_reg(REG_CTRL4, CTRL4_BDU_HR)?;
        Ok(sensor)
    }

    pub fn release(self) -> I {
        self.i2c
    }

    /// Reading `CLICK_SRC` releases the latched INT1 line.
    pub fn clear_click(&mut self) -> Result<u8, SensorError> {
        self.read_reg(REG_CLICK_SRC)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .map_err(|_| SensorError::Bus)?;
        Ok(value[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }
}

impl<I: I2c> TriggerSensor for Lis3dh<I> {
    fn configure_trigger(&mut self, tap_count: TapCount, sensitivity: u8) -> Result<(), SensorError> {
        let click_cfg = match tap_count {
            TapCount::Single => CLICK_CFG_SINGLE_XYZ,
            TapCount::Double => CLICK_CFG_DOUBLE_XYZ,
        };
        self.write_reg(REG_CTRL3, CTRL3_I1_CLICK)?;
        self.write_reg(REG_CLICK_CFG, click_cfg)?;
        self.write_reg(REG_CLICK_THS, CLICK_THS_LIR | (sensitivity & CLICK_THS_MASK))?;
        self.write_reg(REG_TIME_LIMIT, CLICK_TIME_LIMIT)?;
        self.write_reg(REG_TIME_LATENCY, CLICK_TIME_LATENCY)?;
        self.write_reg(REG_TIME_WINDOW, CLICK_TIME_WINDOW)?;
        self.clear_click()?;
        info!(
            "lis3dh: click armed taps={} threshold={}",
            tap_count.as_u8(),
            sensitivity & CLICK_THS_MASK
        );
        Ok(())
    }
}
