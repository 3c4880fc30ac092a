//! Driver for the TAOS TSL2561 light-to-digital converter.
//!
//! The device integrates continuously once powered, so a read just fetches the last completed
//! integration. The timing register is set to the 402 ms integration window at 1x gain, which the
//! 1 s acquisition period comfortably covers.

use super::LightSensor;
use crate::Reading;
use embedded_hal_async::i2c::I2c;

/// Address with the ADDR SEL pin tied to ground
pub const ADDRESS_LOW: u8 = 0x29;
/// Address with the ADDR SEL pin floating
pub const ADDRESS_FLOAT: u8 = 0x39;
/// Address with the ADDR SEL pin tied to VDD
pub const ADDRESS_HIGH: u8 = 0x49;

const COMMAND: u8 = 0x80;
const WORD: u8 = 0x20;

const REG_CONTROL: u8 = 0x00;
const REG_TIMING: u8 = 0x01;
const REG_DATA0: u8 = 0x0C;
const REG_DATA1: u8 = 0x0E;

const POWER_ON: u8 = 0x03;
const POWER_OFF: u8 = 0x00;

/// Raw count at which a channel is saturated with the 402 ms integration window
const SATURATED: u16 = 0xFFFF;

// Fixed point scaling from the TAOS lux approximation
const LUX_SCALE: u32 = 14;
const RATIO_SCALE: u32 = 9;
const CH_SCALE: u32 = 10;

/// (ratio upper bound, CH0 coefficient, CH1 coefficient) for the T, FN and CL packages
const LUX_SEGMENTS: [(u32, u32, u32); 8] = [
    (0x0040, 0x01F2, 0x01BE),
    (0x0080, 0x0214, 0x02D1),
    (0x00C0, 0x023F, 0x037B),
    (0x0100, 0x0270, 0x03FE),
    (0x0138, 0x016F, 0x01FC),
    (0x019A, 0x00D2, 0x00FB),
    (0x029A, 0x0018, 0x0012),
    (u32::MAX, 0x0000, 0x0000),
];

/// Integration window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Integration {
    Ms13,
    Ms101,
    Ms402,
}

impl Integration {
    fn bits(self) -> u8 {
        match self {
            Integration::Ms13 => 0b00,
            Integration::Ms101 => 0b01,
            Integration::Ms402 => 0b10,
        }
    }

    /// Count scaling that normalises to the 402 ms window, in `CH_SCALE` fixed point
    fn channel_scale(self) -> u32 {
        match self {
            Integration::Ms13 => 0x7517,
            Integration::Ms101 => 0x0FE7,
            Integration::Ms402 => 1 << CH_SCALE,
        }
    }

    /// Highest count before the ADC clips
    fn saturation(self) -> u16 {
        match self {
            Integration::Ms13 => 5047,
            Integration::Ms101 => 37177,
            Integration::Ms402 => SATURATED,
        }
    }
}

/// Errors from the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transfer failed
    I2c(E),
    /// Control register didn't read back as powered on
    NotPresent,
    /// A channel clipped, the lux value would be meaningless
    Saturated,
}

/// Raw ADC counts of one integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channels {
    /// Visible and infrared
    pub broadband: u16,
    /// Infrared only
    pub infrared: u16,
}

pub struct Tsl2561<I2C> {
    i2c: I2C,
    address: u8,
    integration: Integration,
    high_gain: bool,
}

impl<I2C: I2c> Tsl2561<I2C> {
    /// Driver for the sensor at `address`, configured for 402 ms integration at 1x gain
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            integration: Integration::Ms402,
            high_gain: false,
        }
    }

    pub fn with_timing(mut self, integration: Integration, high_gain: bool) -> Self {
        self.integration = integration;
        self.high_gain = high_gain;
        self
    }

    /// Power the device up, check it answers and program the timing register
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(REG_CONTROL, POWER_ON).await?;
        // Only the two power bits are defined, the rest read back as don't care
        if self.read_register(REG_CONTROL).await? & 0x03 != POWER_ON {
            return Err(Error::NotPresent);
        }
        let timing = self.integration.bits() | if self.high_gain { 0x10 } else { 0x00 };
        self.write_register(REG_TIMING, timing).await?;
        debug!("TSL2561: powered up at 0x{:x}", self.address);
        Ok(())
    }

    pub async fn power_down(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(REG_CONTROL, POWER_OFF).await
    }

    pub async fn read_channels(&mut self) -> Result<Channels, Error<I2C::Error>> {
        let broadband = self.read_word(REG_DATA0).await?;
        let infrared = self.read_word(REG_DATA1).await?;
        Ok(Channels {
            broadband,
            infrared,
        })
    }

    /// Read both channels and convert them to lux
    pub async fn lux(&mut self) -> Result<u32, Error<I2C::Error>> {
        let channels = self.read_channels().await?;
        let limit = self.integration.saturation();
        if channels.broadband >= limit || channels.infrared >= limit {
            return Err(Error::Saturated);
        }
        Ok(calculate_lux(channels, self.integration, self.high_gain))
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[COMMAND | register, value])
            .await
            .map_err(Error::I2c)?;
        Ok(())
    }

    async fn read_register(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[COMMAND | register], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(buf[0])
    }

    async fn read_word(&mut self, register: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[COMMAND | WORD | register], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(u16::from_le_bytes(buf))
    }
}

impl<I2C: I2c> LightSensor for Tsl2561<I2C> {
    type Error = Error<I2C::Error>;

    async fn read_lux(&mut self) -> Result<Reading, Self::Error> {
        self.lux().await.map(Reading)
    }
}

/// Integer lux approximation from the TSL2561 datasheet for the T, FN and CL packages
pub fn calculate_lux(channels: Channels, integration: Integration, high_gain: bool) -> u32 {
    let mut scale = integration.channel_scale() as u64;
    if !high_gain {
        scale <<= 4;
    }
    let ch0 = (channels.broadband as u64 * scale) >> CH_SCALE;
    let ch1 = (channels.infrared as u64 * scale) >> CH_SCALE;

    let ratio = if ch0 == 0 {
        0
    } else {
        let ratio = (ch1 << (RATIO_SCALE + 1)) / ch0;
        ((ratio + 1) >> 1) as u32
    };

    let (_, b, m) = LUX_SEGMENTS
        .iter()
        .copied()
        .find(|&(bound, _, _)| ratio <= bound)
        .unwrap_or(LUX_SEGMENTS[LUX_SEGMENTS.len() - 1]);

    let weighted = (ch0 * b as u64).saturating_sub(ch1 * m as u64);
    let lux = (weighted + (1 << (LUX_SCALE - 1))) >> LUX_SCALE;
    lux.min(u32::MAX as u64) as u32
}
