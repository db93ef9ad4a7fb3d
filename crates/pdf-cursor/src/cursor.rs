use crate::repeat::RepeatTimer;
use crate::timing::RepeatTiming;
use std::time::Duration;

/// Current slide index driven by a forward and a reverse control
#[derive(Debug, Clone)]
pub struct Cursor {
    reverse: RepeatTimer,
    forward: RepeatTimer,
    position: usize,
    nslides: usize,
}

impl Cursor {
    /// Cursor at the first slide of an `nslides` deck.
    ///
    /// An empty deck behaves like a single slide so the position is always 0.
    pub fn new(nslides: usize) -> Self {
        Self::with_timing(nslides, RepeatTiming::default())
    }

    pub fn with_timing(nslides: usize, timing: RepeatTiming) -> Self {
        Self {
            reverse: RepeatTimer::new(timing),
            forward: RepeatTimer::new(timing),
            position: 0,
            nslides: nslides.max(1),
        }
    }

    /// Cursor starting at `index`, clamped into the deck
    pub fn starting_at(nslides: usize, index: usize) -> Self {
        Self::new(nslides).at(index)
    }

    /// Move to `index` before any input, clamped into the deck
    pub fn at(mut self, index: usize) -> Self {
        self.position = index.min(self.last());
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn nslides(&self) -> usize {
        self.nslides
    }

    /// True while either control is held
    pub fn is_repeating(&self) -> bool {
        self.reverse.is_active() || self.forward.is_active()
    }

    /// Apply one interval of input. Returns true if the position changed.
    ///
    /// Holding both controls is neutral: the cursor does not move and neither
    /// timer sees the interval.
    pub fn tick(&mut self, dt: Duration, reverse_held: bool, forward_held: bool) -> bool {
        if reverse_held && forward_held {
            return false;
        }

        let old = self.position;
        let back = i64::from(self.reverse.tick(dt, reverse_held));
        let ahead = i64::from(self.forward.tick(dt, forward_held));
        let moved = old as i64 - back + ahead;
        self.position = moved.clamp(0, self.last() as i64) as usize;
        self.position != old
    }

    fn last(&self) -> usize {
        self.nslides - 1
    }
}
