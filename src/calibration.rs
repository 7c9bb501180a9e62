//! Zero offset and scale factor

/// Samples averaged by a tare
pub const TARE_SAMPLES: u8 = 64;

/// Offset and multiplier applied to raw ADC codes
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Raw code at zero load
    pub offset: i16,
    /// Physical units per ADC step
    pub multiplier: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            offset: 0,
            multiplier: 1.0,
        }
    }
}

impl Calibration {
    /// Subtract the offset, saturating at the i16 limits instead of wrapping
    pub fn apply(&self, raw: i16) -> i16 {
        let corrected = i32::from(raw) - i32::from(self.offset);
        if corrected > i32::from(i16::MAX) {
            i16::MAX
        } else if corrected < i32::from(i16::MIN) {
            i16::MIN
        } else {
            corrected as i16
        }
    }

    /// Convert a corrected code to physical units
    pub fn scale(&self, value: i16) -> f32 {
        f32::from(value) * self.multiplier
    }
}

/// Running sum for a tare in progress
#[derive(Copy, Clone, Debug, Default)]
pub struct TareAccumulator {
    sum: i32,
    count: u8,
}

impl TareAccumulator {
    /// Add a raw sample. Once [`TARE_SAMPLES`] have been added the truncated
    /// mean is returned and the accumulator starts over.
    pub fn add(&mut self, raw: i16) -> Option<i16> {
        self.sum += i32::from(raw);
        self.count += 1;
        if self.count < TARE_SAMPLES {
            return None;
        }

        let mean = (self.sum / i32::from(TARE_SAMPLES)) as i16;
        *self = TareAccumulator::default();
        Some(mean)
    }

    /// Drop the collected samples
    pub fn reset(&mut self) {
        *self = TareAccumulator::default();
    }
}
