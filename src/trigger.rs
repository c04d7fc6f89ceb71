//! Hysteresis triggers for gate and button inputs.

// -------------------------------------------------------------------------------------------------

/// A bidirectional Schmitt trigger: converts a continuous voltage into discrete edge events,
/// reporting *both* rising and falling transitions.
///
/// The two thresholds form a hysteresis band. The state only flips when the input leaves the
/// band (above `hi` or below `lo`), so noisy signals hovering inside the band never retrigger.
/// Used for gate inputs (key-on when rising, key-off when falling) and as a debouncer for
/// momentary buttons, where press and release both count as a trigger.
#[derive(Debug, Clone)]
pub struct HysteresisTrigger {
    lo: f32,
    hi: f32,
    state: bool,
}

impl HysteresisTrigger {
    /// Default low threshold in volts.
    pub const DEFAULT_LO: f32 = 0.1;
    /// Default high threshold in volts.
    pub const DEFAULT_HI: f32 = 1.0;

    /// Create a new trigger with the default 0.1/1.0 V thresholds, initially low.
    pub const fn new() -> Self {
        Self::with_thresholds(Self::DEFAULT_LO, Self::DEFAULT_HI)
    }

    /// Create a new trigger with custom thresholds, initially low.
    pub const fn with_thresholds(lo: f32, hi: f32) -> Self {
        Self {
            lo,
            hi,
            state: false,
        }
    }

    /// The current state: true when the input last crossed the high threshold.
    #[inline]
    pub const fn state(&self) -> bool {
        self.state
    }

    /// Advance the trigger with a new input value. Returns true iff this call flipped the state,
    /// in either direction.
    #[inline]
    pub fn process(&mut self, value: f32) -> bool {
        if value > self.hi {
            let triggered = !self.state;
            self.state = true;
            triggered
        } else if value < self.lo {
            let triggered = self.state;
            self.state = false;
            triggered
        } else {
            false
        }
    }

    /// Force the trigger back to its initial low state.
    pub fn reset(&mut self) {
        self.state = false;
    }
}

impl Default for HysteresisTrigger {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_produces_one_edge_per_direction() {
        let mut trigger = HysteresisTrigger::new();
        let mut edges = 0;
        // ramp 0 -> 2 -> 0 in small increments
        let mut v = 0.0f32;
        while v < 2.0 {
            if trigger.process(v) {
                edges += 1;
                assert!(trigger.state());
            }
            v += 0.01;
        }
        while v > 0.0 {
            if trigger.process(v) {
                edges += 1;
                assert!(!trigger.state());
            }
            v -= 0.01;
        }
        assert_eq!(edges, 2);
    }

    #[test]
    fn values_inside_band_never_flip_state() {
        let mut trigger = HysteresisTrigger::new();
        for v in [0.2, 0.5, 0.9, 0.99, 0.11] {
            assert!(!trigger.process(v));
            assert!(!trigger.state());
        }
        // latch high, then wander within the band again
        assert!(trigger.process(1.5));
        for v in [0.9, 0.2, 0.11, 0.99] {
            assert!(!trigger.process(v));
            assert!(trigger.state());
        }
    }

    #[test]
    fn repeated_crossings_only_trigger_once() {
        let mut trigger = HysteresisTrigger::new();
        assert!(trigger.process(5.0));
        assert!(!trigger.process(5.0));
        assert!(!trigger.process(8.0));
        assert!(trigger.process(0.0));
        assert!(!trigger.process(0.05));
    }
}
