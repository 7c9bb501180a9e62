//! A platform agnostic driver for a strain gauge load cell read through an
//! ADS1118 16 bit ADC
//!
//! The bridge is amplified by an instrumentation amplifier (AD8553) and fed to
//! the AIN2/AIN3 differential pair of the ADC. The ADC runs in continuous
//! conversion mode, so every SPI transaction returns the most recent result
//! while pushing the configuration again.
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! ```ignore
//! let mut cell = LoadCell::new(spi, cs);
//! cell.init()?;
//! cell.tare(&mut delay)?;
//! cell.set_multiplier(0.05); // grams per step
//! cell.set_average_window(16);
//!
//! loop {
//!     let grams = cell.read_value()?;
//! }
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/0.2

#![deny(missing_docs)]
#![deny(warnings)]
#![cfg_attr(not(test), no_std)]

mod average;
mod calibration;
mod config;

use embedded_hal as hal;
use log::{debug, trace};

use hal::{
    blocking::{
        delay::DelayMs,
        spi::Transfer,
    },
    digital::v2::OutputPin,
    spi::{Mode, MODE_1},
};

pub use average::{RollingAverage, MAX_WINDOW};
pub use calibration::{Calibration, TARE_SAMPLES};
pub use config::{Config, ConversionMode, DataRate, Gain, InputMux};

use calibration::TareAccumulator;

/// SPI mode required by the ADC: clock idle low, data captured on the falling edge
pub const MODE: Mode = MODE_1;

/// Fastest SPI clock the ADC accepts
pub const MAX_SPI_FREQUENCY_HZ: u32 = 4_000_000;

/// Pause after each tare sample, longer than one conversion at 860 SPS
const TARE_SETTLE_MS: u16 = 1;

/// Degrees Celsius per step of the 14 bit temperature result
const TEMPERATURE_LSB: f32 = 0.031_25;

/// Driver error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE, PinE> {
    /// SPI transfer failed
    Spi(SpiE),
    /// Chip select could not be driven
    Pin(PinE),
}

/// Load cell driver
pub struct LoadCell<SPI, CS> {
    spi: SPI,
    cs: CS,
    config: Config,
    calibration: Calibration,
    average: RollingAverage,
    tare: TareAccumulator,
}

impl<SPI, CS, SpiE, PinE> LoadCell<SPI, CS>
where
    SPI: Transfer<u8, Error = SpiE>,
    CS: OutputPin<Error = PinE>,
{
    /// Creates a new driver from an SPI bus and the chip select pin
    ///
    /// The bus must be set up with [`MODE`] and at most
    /// [`MAX_SPI_FREQUENCY_HZ`]. Call [`init`](Self::init) before reading.
    pub fn new(spi: SPI, cs: CS) -> Self {
        LoadCell {
            spi,
            cs,
            config: Config::new(),
            calibration: Calibration::default(),
            average: RollingAverage::new(),
            tare: TareAccumulator::default(),
        }
    }

    /// Destruct the driver and hand back the bus and pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    /// Write the default configuration to the ADC and clear the offset
    ///
    /// The multiplier and the averaging window are kept.
    pub fn init(&mut self) -> Result<(), Error<SpiE, PinE>> {
        self.cs.set_high().map_err(Error::Pin)?;
        self.config = Config::new();
        self.calibration.offset = 0;
        self.tare.reset();
        self.read_raw()?;
        debug!("load cell configured: {:?}", self.config);
        Ok(())
    }

    /// Exchange the configuration for the latest conversion result
    ///
    /// One chip select framed transaction. No offset is applied.
    pub fn read_raw(&mut self) -> Result<i16, Error<SpiE, PinE>> {
        let mut buf = self.config.to_bytes();

        self.cs.set_low().map_err(Error::Pin)?;
        let result = self
            .spi
            .transfer(&mut buf)
            .map(|data| i16::from_be_bytes([data[0], data[1]]));
        // Release the device even if the transfer failed
        self.cs.set_high().map_err(Error::Pin)?;

        let raw = result.map_err(Error::Spi)?;
        trace!("raw {}", raw);
        Ok(raw)
    }

    /// Read one sample, with the offset subtracted when `apply_offset` is set
    ///
    /// The corrected value saturates at the i16 limits.
    pub fn read(&mut self, apply_offset: bool) -> Result<i16, Error<SpiE, PinE>> {
        let raw = self.read_raw()?;
        if apply_offset {
            Ok(self.calibration.apply(raw))
        } else {
            Ok(raw)
        }
    }

    /// Read one sample in physical units
    ///
    /// The offset corrected value goes through the rolling average when it is
    /// enabled and is then scaled by the multiplier.
    pub fn read_value(&mut self) -> Result<f32, Error<SpiE, PinE>> {
        let value = self.read(true)?;
        let value = self.average.push(value);
        Ok(self.calibration.scale(value))
    }

    /// Zero the load cell on the current reading
    ///
    /// Averages [`TARE_SAMPLES`] raw samples with a short pause after each one
    /// and stores the result as offset. Blocks until done.
    pub fn tare<DELAY>(&mut self, delay: &mut DELAY) -> Result<i16, Error<SpiE, PinE>>
    where
        DELAY: DelayMs<u16>,
    {
        self.tare.reset();
        loop {
            let step = self.poll_tare();
            delay.delay_ms(TARE_SETTLE_MS);
            match step {
                Ok(offset) => return Ok(offset),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => {
                    self.tare.reset();
                    return Err(e);
                }
            }
        }
    }

    /// Take one tare sample
    ///
    /// Returns `WouldBlock` until [`TARE_SAMPLES`] samples have been taken,
    /// then stores and returns the new offset. The caller is responsible for
    /// spacing the calls at least one conversion apart.
    pub fn poll_tare(&mut self) -> nb::Result<i16, Error<SpiE, PinE>> {
        let raw = self.read_raw()?;
        match self.tare.add(raw) {
            Some(offset) => {
                self.calibration.offset = offset;
                debug!("tare offset {}", offset);
                Ok(offset)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }

    /// Read the on-chip temperature sensor in degrees Celsius
    ///
    /// Switches the ADC to the sensor, waits for a conversion, then switches
    /// back and waits again so the next load reading is fresh. Only valid in
    /// continuous conversion mode.
    pub fn read_temperature<DELAY>(&mut self, delay: &mut DELAY) -> Result<f32, Error<SpiE, PinE>>
    where
        DELAY: DelayMs<u16>,
    {
        let settle = self.config.data_rate().settle_ms();

        self.config.set_temperature_mode(true);
        let code = self.settled_sample(delay, settle);
        self.config.set_temperature_mode(false);
        let code = code?;

        self.read_raw()?;
        delay.delay_ms(settle);

        // 14 bit result, left justified
        let celsius = f32::from(code >> 2) * TEMPERATURE_LSB;
        debug!("temperature {} C", celsius);
        Ok(celsius)
    }

    fn settled_sample<DELAY>(&mut self, delay: &mut DELAY, settle: u16) -> Result<i16, Error<SpiE, PinE>>
    where
        DELAY: DelayMs<u16>,
    {
        self.read_raw()?;
        delay.delay_ms(settle);
        self.read_raw()
    }

    /// Set the gain by factor: 1, 2, 4, 8 or 16
    ///
    /// Any other value selects gain 2. Returns the gain now configured. Takes
    /// effect with the next transaction.
    pub fn set_gain(&mut self, gain: u8) -> u8 {
        let pga = match Gain::from_factor(gain) {
            Some(pga) => pga,
            None => {
                debug!("gain {} not supported, using 2", gain);
                Gain::X2
            }
        };
        self.set_pga(pga);
        pga.factor()
    }

    /// Set the gain
    pub fn set_pga(&mut self, gain: Gain) {
        self.config.set_gain(gain);
        trace!("gain {:?}", gain);
    }

    /// Currently configured gain
    pub fn gain(&self) -> Gain {
        self.config.gain()
    }

    /// Select the input pair
    pub fn set_input(&mut self, input: InputMux) {
        self.config.set_input(input);
    }

    /// Set the conversion rate
    pub fn set_data_rate(&mut self, rate: DataRate) {
        self.config.set_data_rate(rate);
    }

    /// Switch between continuous and single shot conversions
    pub fn set_conversion_mode(&mut self, mode: ConversionMode) {
        self.config.set_conversion_mode(mode);
    }

    /// Configuration sent with every transaction
    pub fn config(&self) -> Config {
        self.config
    }

    /// Override the offset found by [`tare`](Self::tare), in raw steps
    pub fn set_offset(&mut self, offset: i16) {
        self.calibration.offset = offset;
    }

    /// Offset in raw steps
    pub fn offset(&self) -> i16 {
        self.calibration.offset
    }

    /// Set the physical units per raw step used by [`read_value`](Self::read_value)
    ///
    /// If one step is one gram, 1.0 reads grams and 0.001 reads kilograms.
    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.calibration.multiplier = multiplier;
    }

    /// Physical units per raw step
    pub fn multiplier(&self) -> f32 {
        self.calibration.multiplier
    }

    /// Offset and multiplier
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Number of readings averaged by [`read_value`](Self::read_value), 0 to 32
    ///
    /// 0 disables averaging. Larger values are ignored.
    pub fn set_average_window(&mut self, window: u8) {
        if self.average.set_window(window) {
            debug!("average window {}", window);
        } else {
            debug!("average window {} too large, keeping {}", window, self.average.window());
        }
    }

    /// Active averaging window, 0 when disabled
    pub fn average_window(&self) -> u8 {
        self.average.window()
    }

    /// True when readings are averaged
    pub fn is_averaging(&self) -> bool {
        self.average.is_enabled()
    }
}
