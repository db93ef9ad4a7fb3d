use crate::timing::RepeatTiming;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Phase of a single control's press/repeat cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatState {
    /// Control is up
    #[default]
    Released,
    /// Control is down and has fired once, waiting for the trigger delay
    Holding,
    /// Control is down past the trigger delay and fires every interval
    Repeating,
}

/// Press-then-repeat state machine for one control.
///
/// Each [`tick`](RepeatTimer::tick) reports how many navigation events the
/// control produced during the interval. Pressing fires once immediately,
/// holding past the trigger delay fires again, and further holding fires once
/// per repeat interval. Large intervals catch up by firing several times in a
/// single tick. Releasing never fires.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    state: RepeatState,
    // Only meaningful while Holding or Repeating.
    stopwatch: Duration,
    timing: RepeatTiming,
}

impl Default for RepeatTimer {
    fn default() -> Self {
        Self::new(RepeatTiming::default())
    }
}

impl RepeatTimer {
    pub fn new(timing: RepeatTiming) -> Self {
        Self {
            state: RepeatState::Released,
            stopwatch: Duration::ZERO,
            timing,
        }
    }

    pub fn state(&self) -> RepeatState {
        self.state
    }

    pub fn timing(&self) -> RepeatTiming {
        self.timing
    }

    /// True while the control is held, whether or not it is repeating yet
    pub fn is_active(&self) -> bool {
        self.state != RepeatState::Released
    }

    /// Process one interval of length `dt` and return the number of fires
    pub fn tick(&mut self, dt: Duration, held: bool) -> u32 {
        if !held {
            self.state = RepeatState::Released;
            return 0;
        }

        match self.state {
            RepeatState::Released => {
                self.state = RepeatState::Holding;
                self.stopwatch = dt;
                1
            }
            RepeatState::Holding => {
                self.stopwatch += dt;
                if self.stopwatch < self.timing.trigger_delay {
                    return 0;
                }
                self.state = RepeatState::Repeating;
                self.stopwatch -= self.timing.trigger_delay;
                1 + self.countdown()
            }
            RepeatState::Repeating => {
                self.stopwatch += dt;
                self.countdown()
            }
        }
    }

    fn countdown(&mut self) -> u32 {
        let interval = self.timing.repeat_interval.as_nanos();
        if interval == 0 {
            return 0;
        }
        let elapsed = self.stopwatch.as_nanos();
        let left = elapsed % interval;
        // Whatever is left is shorter than the interval, so it fits a Duration.
        self.stopwatch = Duration::new(
            (left / NANOS_PER_SEC) as u64,
            (left % NANOS_PER_SEC) as u32,
        );
        u32::try_from(elapsed / interval).unwrap_or(u32::MAX)
    }
}
