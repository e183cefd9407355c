//! Per-round countdown used by timed mode.

pub const MIN_ROUND_SECS: u32 = 5;
pub const MAX_ROUND_SECS: u32 = 20;
pub const DEFAULT_ROUND_SECS: u32 = 10;

const TICK_MS: f64 = 1_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        remaining_secs: u32,
        next_tick_ms: f64, // performance.now() of the next whole-second decrement
    },
}

/// What happened while advancing the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Quiet,
    Ticked { remaining_secs: u32 },
    Expired,
}

impl TimerState {
    pub fn started(duration_secs: u32, now: f64) -> Self {
        TimerState::Running {
            remaining_secs: duration_secs,
            next_tick_ms: now + TICK_MS,
        }
    }

    pub fn cancel(&mut self) {
        *self = TimerState::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        match *self {
            TimerState::Running { remaining_secs, .. } => Some(remaining_secs),
            TimerState::Idle => None,
        }
    }

    /// Catch up on every whole second elapsed up to `now`. Reaching zero moves
    /// the timer to Idle and reports `Expired` exactly once.
    pub fn advance(&mut self, now: f64) -> TimerEvent {
        let TimerState::Running {
            remaining_secs,
            next_tick_ms,
        } = self
        else {
            return TimerEvent::Quiet;
        };
        let mut ticked = false;
        while *remaining_secs > 0 && now >= *next_tick_ms {
            *remaining_secs -= 1;
            *next_tick_ms += TICK_MS;
            ticked = true;
        }
        if *remaining_secs == 0 {
            *self = TimerState::Idle;
            TimerEvent::Expired
        } else if ticked {
            TimerEvent::Ticked {
                remaining_secs: *remaining_secs,
            }
        } else {
            TimerEvent::Quiet
        }
    }
}
