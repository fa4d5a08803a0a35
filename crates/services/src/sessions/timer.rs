/// Identifies one started countdown.
///
/// Handles are never reused within a `QuizSession`, so a tick carrying an old
/// handle can be told apart from a tick of the countdown currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Result of delivering one tick to a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountdownTick {
    /// The tick belongs to a cancelled or replaced countdown.
    Stale,
    Running(u32),
    /// Reached zero; the countdown has stopped itself.
    Expired,
}

/// Whole-second countdown owned by the active question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Countdown {
    remaining: u32,
    active: Option<TimerHandle>,
}

impl Countdown {
    pub(crate) fn start(handle: TimerHandle, secs: u32) -> Self {
        Self {
            remaining: secs,
            active: Some(handle),
        }
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn active(&self) -> Option<TimerHandle> {
        self.active
    }

    /// Stops the countdown, keeping the remaining seconds for display.
    pub(crate) fn cancel(&mut self) {
        self.active = None;
    }

    pub(crate) fn tick(&mut self, handle: TimerHandle) -> CountdownTick {
        if self.active != Some(handle) {
            return CountdownTick::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = None;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }
}
