//! Round engine: the per-level session state (target, round counter, built
//! rewards, feedback) and the pure transitions on it. Scheduling and sound live
//! one layer up in `game`.

use crate::level::Level;
use crate::rng::RandomSource;

/// Rounds per session before auto-advance stops.
pub const TOTAL_ROUNDS: u32 = 10;

/// Building hues (degrees) a reward may get.
pub const REWARD_HUES: [u16; 7] = [16, 28, 40, 190, 220, 260, 300];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RewardId(pub u64);

/// One building in the player's city.
#[derive(Clone, Debug, PartialEq)]
pub struct Reward {
    pub id: RewardId,
    pub hue: u16,
    pub window_count: u32,
    pub height_px: u32,
}

impl Reward {
    fn for_target(id: RewardId, target: u32, hue: u16) -> Self {
        Self {
            id,
            hue,
            window_count: target.clamp(3, 9),
            height_px: 80 + target.saturating_mul(8).min(120),
        }
    }

    /// CSS colour for the building body.
    pub fn css_color(&self) -> String {
        format!("hsl({}deg 90% 55%)", self.hue)
    }
}

/// Result of an answer submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    /// No level selected; nothing changed.
    NoLevel,
    Correct {
        reward_added: bool,
        /// The round cap is reached; no automatic advance follows.
        session_complete: bool,
    },
    Incorrect,
}

#[derive(Debug, Default)]
pub struct Session {
    level: Option<&'static Level>,
    target: u32,
    round_index: u32,
    rewards: Vec<Reward>,
    feedback: Feedback,
    shake_token: u32,
    next_reward_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            target: 1,
            ..Self::default()
        }
    }

    pub fn level(&self) -> Option<&'static Level> {
        self.level
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Bumped on every failed attempt so the view can replay its shake animation.
    pub fn shake_token(&self) -> u32 {
        self.shake_token
    }

    pub fn is_complete(&self) -> bool {
        self.round_index >= TOTAL_ROUNDS
    }

    /// Fraction of the session played, capped at 1.
    pub fn progress(&self) -> f64 {
        (self.round_index as f64 / TOTAL_ROUNDS as f64).min(1.0)
    }

    /// Switch level and clear all per-session state (does not start a round).
    pub fn select_level(&mut self, level: &'static Level) {
        self.level = Some(level);
        self.reset();
    }

    /// Clear rewards, round counter and feedback. The active level is kept.
    pub fn reset(&mut self) {
        self.rewards.clear();
        self.round_index = 0;
        self.feedback = Feedback::None;
    }

    /// Draw a new target in `1..=answer_range` and bump the round counter.
    /// Returns `false` (no-op) when no level is active.
    pub fn start_round(&mut self, rng: &mut dyn RandomSource) -> bool {
        let Some(level) = self.level else {
            return false;
        };
        self.target = rng.inclusive_from_one(level.answer_range);
        self.round_index += 1;
        self.feedback = Feedback::None;
        true
    }

    pub fn submit_answer(&mut self, n: u32, rng: &mut dyn RandomSource) -> Answer {
        if self.level.is_none() {
            return Answer::NoLevel;
        }
        if n != self.target {
            self.feedback = Feedback::Incorrect;
            self.shake_token = self.shake_token.wrapping_add(1);
            return Answer::Incorrect;
        }
        self.feedback = Feedback::Correct;
        let reward_added = (self.rewards.len() as u32) < TOTAL_ROUNDS;
        if reward_added {
            let hue = REWARD_HUES[rng.below(REWARD_HUES.len() as u32) as usize];
            let id = RewardId(self.next_reward_id);
            self.next_reward_id += 1;
            self.rewards.push(Reward::for_target(id, self.target, hue));
        }
        Answer::Correct {
            reward_added,
            session_complete: self.is_complete(),
        }
    }

    /// Forced failure (countdown expiry): same visible effect as a wrong answer.
    pub fn mark_timed_out(&mut self) {
        self.feedback = Feedback::Incorrect;
        self.shake_token = self.shake_token.wrapping_add(1);
    }

    pub fn clear_feedback(&mut self) {
        self.feedback = Feedback::None;
    }
}
