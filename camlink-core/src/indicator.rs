//! Status LED patterns

use camlink_hal::OutputPin;
use heapless::Vec;

/// Max steps in one blink cycle
const MAX_STEPS: usize = 5;

/// Status LED modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    #[default]
    Off,
    /// Slow blink, 1 s cycle
    Idle,
    /// Fast blink, 200 ms cycle
    Capturing,
    /// Solid on
    Ready,
    /// Very fast blink, 50 ms cycle
    Transferring,
    /// Double blink then pause
    Error,
}

impl LedMode {
    /// Blink steps for this mode
    pub fn pattern(self) -> BlinkPattern {
        let steps: &[(bool, u32)] = match self {
            LedMode::Off => &[(false, 1000)],
            LedMode::Idle => &[(true, 500), (false, 500)],
            LedMode::Capturing => &[(true, 100), (false, 100)],
            LedMode::Ready => &[(true, 1000)],
            LedMode::Transferring => &[(true, 25), (false, 25)],
            LedMode::Error => &[(true, 100), (false, 200), (true, 100), (false, 200), (false, 800)],
        };
        BlinkPattern::new(steps)
    }
}

/// Endless sequence of `(level, duration_ms)` steps
#[derive(Debug, Clone)]
pub struct BlinkPattern {
    steps: Vec<(bool, u32), MAX_STEPS>,
    index: usize,
}

impl BlinkPattern {
    fn new(steps: &[(bool, u32)]) -> Self {
        let mut v = Vec::new();
        for &step in steps.iter().take(MAX_STEPS) {
            // Cannot fail: bounded by take()
            let _ = v.push(step);
        }
        Self { steps: v, index: 0 }
    }

    /// Total duration of one cycle
    pub fn cycle_ms(&self) -> u32 {
        self.steps.iter().map(|&(_, ms)| ms).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Iterator for BlinkPattern {
    type Item = (bool, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let step = *self.steps.get(self.index)?;
        self.index = (self.index + 1) % self.steps.len();
        Some(step)
    }
}

/// Drives an LED pin through the pattern for the current mode
///
/// Call `update` periodically with a monotonic millisecond clock.
pub struct StatusLed<P: OutputPin> {
    pin: P,
    mode: LedMode,
    pattern: BlinkPattern,
    step_end_ms: u64,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self {
            pin,
            mode: LedMode::Off,
            pattern: LedMode::Off.pattern(),
            step_end_ms: 0,
        }
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    /// Switch mode; the new pattern starts on the next `update`
    pub fn set_mode(&mut self, mode: LedMode) {
        if mode != self.mode {
            self.mode = mode;
            self.pattern = mode.pattern();
            self.step_end_ms = 0;
        }
    }

    /// Advance the pattern to `now_ms`
    pub fn update(&mut self, now_ms: u64) {
        if now_ms < self.step_end_ms {
            return;
        }
        if let Some((level, duration)) = self.pattern.next() {
            self.pin.set_level(level);
            self.step_end_ms = now_ms + duration as u64;
        }
    }

    pub fn is_on(&self) -> bool {
        self.pin.is_set_high()
    }

    pub fn free(self) -> P {
        self.pin
    }
}
