//! ADS1118 configuration register
//!
//! The 16 bit register is sent as two bytes on every transaction.
//!
//! High byte:
//!
//! | Bit | Field                                   |
//! |-----|-----------------------------------------|
//! | 7   | SS, single shot start                   |
//! | 6:4 | MUX, input multiplexer                  |
//! | 3:1 | PGA, programmable gain amplifier        |
//! | 0   | MODE, 0 continuous, 1 single shot       |
//!
//! Low byte:
//!
//! | Bit | Field                                   |
//! |-----|-----------------------------------------|
//! | 7:5 | DR, data rate                           |
//! | 4   | TS_MODE, read the temperature sensor    |
//! | 3   | PULL_UP_EN, pull-up on DOUT             |
//! | 2:1 | NOP, must be `01` to update the config  |
//! | 0   | not used                                |

const MUX_SHIFT: u8 = 4;
const MUX_MASK: u8 = 0b0111_0000;
const PGA_SHIFT: u8 = 1;
const PGA_MASK: u8 = 0b0000_1110;
const MODE_MASK: u8 = 0b0000_0001;

const DR_SHIFT: u8 = 5;
const DR_MASK: u8 = 0b1110_0000;
const TS_MODE_MASK: u8 = 0b0001_0000;
const PULL_UP_MASK: u8 = 0b0000_1000;
const NOP_MASK: u8 = 0b0000_0110;
/// `01` in the NOP field, the device only latches the new config with this value
const NOP_UPDATE: u8 = 0b0000_0010;

/// AIN2/AIN3 differential, gain 2, continuous conversion
const DEFAULT_HIGH: u8 = 0x34;
/// 860 SPS, ADC mode, no pull-up, update marker set
const DEFAULT_LOW: u8 = 0xE2;

/// Programmable gain of the ADC front end
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// Gain 1, full scale ±4.096 V
    X1 = 1,
    /// Gain 2, full scale ±2.048 V (default)
    X2 = 2,
    /// Gain 4, full scale ±1.024 V
    X4 = 3,
    /// Gain 8, full scale ±0.512 V
    X8 = 4,
    /// Gain 16, full scale ±0.256 V
    X16 = 5,
}

impl Gain {
    /// Look up the gain for a multiplication factor of 1, 2, 4, 8 or 16
    pub fn from_factor(factor: u8) -> Option<Self> {
        match factor {
            1 => Some(Gain::X1),
            2 => Some(Gain::X2),
            4 => Some(Gain::X4),
            8 => Some(Gain::X8),
            16 => Some(Gain::X16),
            _ => None,
        }
    }

    /// Multiplication factor
    pub fn factor(self) -> u8 {
        1 << (self as u8 - 1)
    }

    /// Full scale range in millivolts, the input spans ± this value
    pub fn full_scale_mv(self) -> u16 {
        4096 >> (self as u8 - 1)
    }

    /// Size of one ADC step in microvolts
    pub fn microvolts_per_lsb(self) -> f32 {
        self.full_scale_mv() as f32 * 1000.0 / 32768.0
    }

    fn from_pga_bits(bits: u8) -> Self {
        match bits {
            1 => Gain::X1,
            2 => Gain::X2,
            3 => Gain::X4,
            4 => Gain::X8,
            // 5, 6 and 7 all select ±0.256 V, 0 is never encoded
            _ => Gain::X16,
        }
    }
}

/// Input multiplexer setting, positive input first
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMux {
    /// AIN0 - AIN1
    Ain0Ain1 = 0,
    /// AIN0 - AIN3
    Ain0Ain3 = 1,
    /// AIN1 - AIN3
    Ain1Ain3 = 2,
    /// AIN2 - AIN3, where the amplifier is wired
    Ain2Ain3 = 3,
    /// AIN0 - GND
    Ain0Gnd = 4,
    /// AIN1 - GND
    Ain1Gnd = 5,
    /// AIN2 - GND
    Ain2Gnd = 6,
    /// AIN3 - GND
    Ain3Gnd = 7,
}

impl InputMux {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => InputMux::Ain0Ain1,
            1 => InputMux::Ain0Ain3,
            2 => InputMux::Ain1Ain3,
            3 => InputMux::Ain2Ain3,
            4 => InputMux::Ain0Gnd,
            5 => InputMux::Ain1Gnd,
            6 => InputMux::Ain2Gnd,
            _ => InputMux::Ain3Gnd,
        }
    }
}

/// Conversion mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    /// Convert back to back, every transaction returns the latest result
    Continuous = 0,
    /// Power down between conversions
    SingleShot = 1,
}

/// Output data rate in samples per second
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 8 SPS
    Sps8 = 0,
    /// 16 SPS
    Sps16 = 1,
    /// 32 SPS
    Sps32 = 2,
    /// 64 SPS
    Sps64 = 3,
    /// 128 SPS
    Sps128 = 4,
    /// 250 SPS
    Sps250 = 5,
    /// 475 SPS
    Sps475 = 6,
    /// 860 SPS (default)
    Sps860 = 7,
}

impl DataRate {
    /// Samples per second
    pub fn sps(self) -> u16 {
        match self {
            DataRate::Sps8 => 8,
            DataRate::Sps16 => 16,
            DataRate::Sps32 => 32,
            DataRate::Sps64 => 64,
            DataRate::Sps128 => 128,
            DataRate::Sps250 => 250,
            DataRate::Sps475 => 475,
            DataRate::Sps860 => 860,
        }
    }

    /// Milliseconds to wait for a fresh conversion after a config change
    pub fn settle_ms(self) -> u16 {
        1000 / self.sps() + 1
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => DataRate::Sps8,
            1 => DataRate::Sps16,
            2 => DataRate::Sps32,
            3 => DataRate::Sps64,
            4 => DataRate::Sps128,
            5 => DataRate::Sps250,
            6 => DataRate::Sps475,
            _ => DataRate::Sps860,
        }
    }
}

/// The two configuration bytes
///
/// Only constructed through [`Config::new`] and the setters, so the update
/// marker is always present and the PGA field always holds a [`Gain`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    high: u8,
    low: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Power-up configuration of the load cell channel
    pub const fn new() -> Self {
        Config {
            high: DEFAULT_HIGH,
            low: DEFAULT_LOW,
        }
    }

    /// Bytes in wire order
    pub fn to_bytes(self) -> [u8; 2] {
        [self.high, self.low]
    }

    /// High byte: mux, gain, mode
    pub fn high(self) -> u8 {
        self.high
    }

    /// Low byte: data rate, sensor select, pull-up, update marker
    pub fn low(self) -> u8 {
        self.low
    }

    /// Current gain
    pub fn gain(self) -> Gain {
        Gain::from_pga_bits((self.high & PGA_MASK) >> PGA_SHIFT)
    }

    /// Replace the PGA field
    pub fn set_gain(&mut self, gain: Gain) {
        self.high = (self.high & !PGA_MASK) | ((gain as u8) << PGA_SHIFT);
    }

    /// Current input pair
    pub fn input(self) -> InputMux {
        InputMux::from_bits((self.high & MUX_MASK) >> MUX_SHIFT)
    }

    /// Replace the MUX field
    pub fn set_input(&mut self, input: InputMux) {
        self.high = (self.high & !MUX_MASK) | ((input as u8) << MUX_SHIFT);
    }

    /// Current conversion mode
    pub fn conversion_mode(self) -> ConversionMode {
        if self.high & MODE_MASK == 0 {
            ConversionMode::Continuous
        } else {
            ConversionMode::SingleShot
        }
    }

    /// Replace the MODE bit
    pub fn set_conversion_mode(&mut self, mode: ConversionMode) {
        self.high = (self.high & !MODE_MASK) | mode as u8;
    }

    /// Current data rate
    pub fn data_rate(self) -> DataRate {
        DataRate::from_bits((self.low & DR_MASK) >> DR_SHIFT)
    }

    /// Replace the DR field
    pub fn set_data_rate(&mut self, rate: DataRate) {
        self.low = (self.low & !DR_MASK) | ((rate as u8) << DR_SHIFT);
    }

    /// True when conversions come from the on-chip temperature sensor
    pub fn temperature_mode(self) -> bool {
        self.low & TS_MODE_MASK != 0
    }

    /// Switch between the ADC inputs and the temperature sensor
    pub fn set_temperature_mode(&mut self, enabled: bool) {
        self.set_low_flag(TS_MODE_MASK, enabled);
    }

    /// True when the internal pull-up on DOUT is enabled
    pub fn pull_up(self) -> bool {
        self.low & PULL_UP_MASK != 0
    }

    /// Enable or disable the internal pull-up on DOUT
    pub fn set_pull_up(&mut self, enabled: bool) {
        self.set_low_flag(PULL_UP_MASK, enabled);
    }

    fn set_low_flag(&mut self, mask: u8, enabled: bool) {
        if enabled {
            self.low |= mask;
        } else {
            self.low &= !mask;
        }
        self.low = (self.low & !NOP_MASK) | NOP_UPDATE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAINS: [Gain; 5] = [Gain::X1, Gain::X2, Gain::X4, Gain::X8, Gain::X16];

    #[test]
    fn default_bytes() {
        let config = Config::new();
        assert_eq!(config.to_bytes(), [0x34, 0xE2]);
        assert_eq!(config.input(), InputMux::Ain2Ain3);
        assert_eq!(config.gain(), Gain::X2);
        assert_eq!(config.conversion_mode(), ConversionMode::Continuous);
        assert_eq!(config.data_rate(), DataRate::Sps860);
        assert!(!config.temperature_mode());
        assert!(!config.pull_up());
        assert_eq!(config.low() & NOP_MASK, NOP_UPDATE);
    }

    #[test]
    fn gain_only_touches_pga_bits() {
        for &gain in GAINS.iter() {
            let mut config = Config::new();
            config.set_gain(gain);
            assert_eq!(config.gain(), gain);
            assert_eq!(config.high() & !PGA_MASK, DEFAULT_HIGH & !PGA_MASK);
            assert_eq!(config.low(), DEFAULT_LOW);
        }
    }

    #[test]
    fn gain_encoding() {
        let mut config = Config::new();
        config.set_gain(Gain::X16);
        assert_eq!(config.high(), 0x3A);
        config.set_gain(Gain::X1);
        assert_eq!(config.high(), 0x32);
    }

    #[test]
    fn gain_factors() {
        for &gain in GAINS.iter() {
            assert_eq!(Gain::from_factor(gain.factor()), Some(gain));
        }
        assert_eq!(Gain::from_factor(0), None);
        assert_eq!(Gain::from_factor(3), None);
        assert_eq!(Gain::from_factor(32), None);
        assert_eq!(Gain::X2.full_scale_mv(), 2048);
        assert_eq!(Gain::X16.full_scale_mv(), 256);
        assert_eq!(Gain::X2.microvolts_per_lsb(), 62.5);
    }

    #[test]
    fn fields_are_independent() {
        let mut config = Config::new();
        config.set_input(InputMux::Ain0Gnd);
        config.set_conversion_mode(ConversionMode::SingleShot);
        config.set_data_rate(DataRate::Sps128);
        config.set_pull_up(true);

        assert_eq!(config.input(), InputMux::Ain0Gnd);
        assert_eq!(config.gain(), Gain::X2);
        assert_eq!(config.conversion_mode(), ConversionMode::SingleShot);
        assert_eq!(config.data_rate(), DataRate::Sps128);
        assert!(config.pull_up());
        assert_eq!(config.to_bytes(), [0x45, 0x8A]);
    }

    #[test]
    fn temperature_mode_keeps_marker() {
        let mut config = Config::new();
        config.set_temperature_mode(true);
        assert_eq!(config.low(), 0xF2);
        config.set_temperature_mode(false);
        assert_eq!(config, Config::new());
    }

    #[test]
    fn settle_time() {
        assert_eq!(DataRate::Sps860.settle_ms(), 2);
        assert_eq!(DataRate::Sps8.settle_ms(), 126);
    }
}
