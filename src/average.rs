//! Rolling average over the most recent readings

/// Number of slots in the ring, the largest usable window
pub const MAX_WINDOW: u8 = 32;

/// Fixed capacity ring buffer returning the mean of the last `window` values
///
/// Slots are zero at start and are not cleared when the window changes, so
/// the mean ramps up until the window has been filled once.
#[derive(Clone, Debug)]
pub struct RollingAverage {
    slots: [i16; MAX_WINDOW as usize],
    window: u8,
    index: u8,
}

impl Default for RollingAverage {
    fn default() -> Self {
        RollingAverage::new()
    }
}

impl RollingAverage {
    /// Disabled filter with all slots zeroed
    pub const fn new() -> Self {
        RollingAverage {
            slots: [0; MAX_WINDOW as usize],
            window: 0,
            index: 0,
        }
    }

    /// Active window length, 0 when disabled
    pub fn window(&self) -> u8 {
        self.window
    }

    /// True when a window of at least one sample is active
    pub fn is_enabled(&self) -> bool {
        self.window > 0
    }

    /// Set the window length. 0 disables the filter.
    ///
    /// Returns false and leaves the filter untouched for lengths above
    /// [`MAX_WINDOW`].
    pub fn set_window(&mut self, window: u8) -> bool {
        if window > MAX_WINDOW {
            return false;
        }
        self.window = window;
        true
    }

    /// Store a value and return the mean of the window
    pub fn push(&mut self, value: i16) -> i16 {
        if self.window == 0 {
            return value;
        }

        self.index += 1;
        if self.index >= self.window {
            self.index = 0;
        }
        self.slots[self.index as usize] = value;

        let sum: i32 = self.slots[..self.window as usize]
            .iter()
            .map(|&v| i32::from(v))
            .sum();
        (sum / i32::from(self.window)) as i16
    }
}
