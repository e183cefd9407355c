//! Game orchestrator. Owns the session, the countdown, the one pending delayed
//! action and the sound sink, and wires player input to all of them.
//!
//! Time is passed in explicitly (`performance.now()` in the browser) and the
//! frame loop calls [`Game::tick`]. Delayed work is a single owned
//! [`Pending`] slot: every transition replaces or clears it, so a reset or
//! level change can never be overtaken by a continuation from the old session.

use crate::config::GameConfig;
use crate::level;
use crate::rng::RandomSource;
use crate::session::{Answer, Feedback, Session};
use crate::timer::{MAX_ROUND_SECS, MIN_ROUND_SECS, TimerEvent, TimerState};
use crate::tone::{Cue, CueSink, master_gain};

/// Pause after a correct answer before the next round.
pub const CORRECT_ADVANCE_MS: f64 = 700.0;
/// How long a wrong-answer (or timeout) flash stays up.
pub const WRONG_CLEAR_MS: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    StartRound,
    ClearFeedback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pending {
    pub due_ms: f64,
    pub action: Continuation,
}

pub struct Game<R: RandomSource, S: CueSink> {
    session: Session,
    timer: TimerState,
    pending: Option<Pending>,
    config: GameConfig,
    rng: R,
    sink: S,
}

impl<R: RandomSource, S: CueSink> Game<R, S> {
    pub fn new(config: GameConfig, rng: R, mut sink: S) -> Self {
        let config = config.sanitized();
        sink.set_master_gain(master_gain(config.volume, config.muted));
        Self {
            session: Session::new(),
            timer: TimerState::Idle,
            pending: None,
            config,
            rng,
            sink,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    // --- Player input ---------------------------------------------------------

    /// Switch to level `id` and start its first round. Unknown ids are ignored.
    pub fn select_level(&mut self, id: u8, now: f64) {
        let Some(lvl) = level::find(id) else {
            log::debug!("ignoring unknown level id {id}");
            return;
        };
        self.sink.play(Cue::Click);
        self.session.select_level(lvl);
        self.pending = None;
        self.timer.cancel();
        self.begin_round(now);
    }

    pub fn submit_answer(&mut self, n: u32, now: f64) {
        if self.session.level().is_none() {
            return;
        }
        // An advance is already in flight; accepting input now would either
        // cancel it or stack a second one.
        if self.advance_pending() || self.session.feedback() == Feedback::Correct {
            log::debug!("answer {n} ignored while round resolves");
            return;
        }
        match self.session.submit_answer(n, &mut self.rng) {
            Answer::NoLevel => {}
            Answer::Correct {
                reward_added,
                session_complete,
            } => {
                if let Some(lvl) = self.session.level() {
                    self.sink.play(Cue::celebrate(lvl));
                }
                self.timer.cancel();
                let action = if session_complete {
                    Continuation::ClearFeedback
                } else {
                    Continuation::StartRound
                };
                self.schedule(action, CORRECT_ADVANCE_MS, now);
                log::debug!(
                    "round {} solved (reward added: {reward_added}, complete: {session_complete})",
                    self.session.round_index()
                );
            }
            Answer::Incorrect => {
                self.sink.play(Cue::Wrong);
                self.schedule(Continuation::ClearFeedback, WRONG_CLEAR_MS, now);
            }
        }
    }

    /// Manual "next question". Not limited by the round cap.
    pub fn next_question(&mut self, now: f64) {
        if self.session.level().is_none() {
            return;
        }
        self.sink.play(Cue::Click);
        self.begin_round(now);
    }

    pub fn reset_session(&mut self, now: f64) {
        self.sink.play(Cue::Click);
        self.session.reset();
        self.pending = None;
        self.timer.cancel();
        if self.session.level().is_some() {
            self.begin_round(now);
        }
    }

    pub fn set_timed_mode(&mut self, on: bool, now: f64) {
        if self.config.timed_mode == on {
            return;
        }
        self.sink.play(Cue::Click);
        self.config.timed_mode = on;
        if on {
            if !self.advance_pending() {
                self.arm_timer(now);
            }
        } else {
            self.timer.cancel();
        }
    }

    /// New countdown length; applies from the next round start.
    pub fn set_round_seconds(&mut self, secs: u32) {
        self.config.round_seconds = secs.clamp(MIN_ROUND_SECS, MAX_ROUND_SECS);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.config = GameConfig {
            volume,
            ..self.config.clone()
        }
        .sanitized();
        self.push_gain();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
        self.push_gain();
    }

    /// Apply a whole settings document at once.
    pub fn apply_config(&mut self, config: GameConfig, now: f64) {
        let config = config.sanitized();
        self.set_round_seconds(config.round_seconds);
        self.config.volume = config.volume;
        self.config.muted = config.muted;
        self.push_gain();
        self.set_timed_mode(config.timed_mode, now);
    }

    // --- Clock ----------------------------------------------------------------

    /// Run whatever is due at `now`: the pending continuation first, then the
    /// countdown.
    pub fn tick(&mut self, now: f64) {
        if let Some(p) = self.pending {
            if now >= p.due_ms {
                self.pending = None;
                match p.action {
                    Continuation::StartRound => self.begin_round(now),
                    Continuation::ClearFeedback => self.session.clear_feedback(),
                }
            }
        }
        match self.timer.advance(now) {
            TimerEvent::Expired => {
                log::debug!("round {} timed out", self.session.round_index());
                self.session.mark_timed_out();
                self.sink.play(Cue::Wrong);
                let action = if self.session.is_complete() {
                    Continuation::ClearFeedback
                } else {
                    Continuation::StartRound
                };
                self.schedule(action, WRONG_CLEAR_MS, now);
            }
            TimerEvent::Ticked { .. } | TimerEvent::Quiet => {}
        }
    }

    // --- Internals --------------------------------------------------------------

    fn begin_round(&mut self, now: f64) {
        self.pending = None;
        if self.session.start_round(&mut self.rng) {
            log::debug!(
                "round {} target {}",
                self.session.round_index(),
                self.session.target()
            );
        }
        self.arm_timer(now);
    }

    fn arm_timer(&mut self, now: f64) {
        self.timer = if self.config.timed_mode
            && self.session.level().is_some()
            && self.session.feedback() != Feedback::Correct
        {
            TimerState::started(self.config.round_seconds, now)
        } else {
            TimerState::Idle
        };
    }

    fn schedule(&mut self, action: Continuation, delay_ms: f64, now: f64) {
        self.pending = Some(Pending {
            due_ms: now + delay_ms,
            action,
        });
    }

    /// A round start is already scheduled.
    fn advance_pending(&self) -> bool {
        matches!(
            self.pending,
            Some(Pending {
                action: Continuation::StartRound,
                ..
            })
        )
    }

    fn push_gain(&mut self) {
        self.sink
            .set_master_gain(master_gain(self.config.volume, self.config.muted));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;
    use crate::session::TOTAL_ROUNDS;
    use crate::tone::RecordingSink;

    fn game(draws: &[u32]) -> Game<SequenceRandom, RecordingSink> {
        Game::new(
            GameConfig::default(),
            SequenceRandom::new(draws.iter().copied()),
            RecordingSink::default(),
        )
    }

    fn timed_game(secs: u32) -> Game<SequenceRandom, RecordingSink> {
        Game::new(
            GameConfig {
                timed_mode: true,
                round_seconds: secs,
                ..GameConfig::default()
            },
            SequenceRandom::default(),
            RecordingSink::default(),
        )
    }

    #[test]
    fn unknown_level_is_noop() {
        let mut g = game(&[]);
        g.select_level(9, 0.0);
        assert!(g.session().level().is_none());
        assert_eq!(g.session().round_index(), 0);
        assert!(g.sink().played.is_empty());
    }

    #[test]
    fn wrong_then_right_scenario() {
        // level 2 target 7
        let mut g = game(&[6]);
        g.select_level(2, 0.0);
        assert_eq!(g.session().target(), 7);
        assert_eq!(g.session().round_index(), 1);

        g.submit_answer(3, 100.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
        assert!(g.session().rewards().is_empty());
        assert_eq!(g.session().target(), 7);
        assert_eq!(g.sink().played.last(), Some(&Cue::Wrong));

        g.tick(699.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
        g.tick(700.0);
        assert_eq!(g.session().feedback(), Feedback::None);

        g.submit_answer(7, 800.0);
        assert_eq!(g.session().feedback(), Feedback::Correct);
        assert_eq!(g.session().rewards().len(), 1);
        assert!(matches!(g.sink().played.last(), Some(Cue::Celebrate { .. })));

        g.tick(1_499.0);
        assert_eq!(g.session().round_index(), 1);
        g.tick(1_500.0);
        assert_eq!(g.session().round_index(), 2);
        assert_eq!(g.session().feedback(), Feedback::None);
    }

    #[test]
    fn answers_ignored_while_advance_pending() {
        let mut g = game(&[0]);
        g.select_level(1, 0.0);
        g.submit_answer(1, 10.0);
        g.submit_answer(2, 20.0);
        g.submit_answer(1, 30.0);
        assert_eq!(g.session().rewards().len(), 1);
        assert_eq!(g.session().feedback(), Feedback::Correct);
        assert_eq!(
            g.pending(),
            Some(Pending {
                due_ms: 710.0,
                action: Continuation::StartRound
            })
        );
    }

    #[test]
    fn level_change_cancels_in_flight_advance() {
        let mut g = game(&[0]);
        g.select_level(1, 0.0);
        g.submit_answer(1, 100.0);
        g.select_level(3, 200.0);
        assert_eq!(g.session().round_index(), 1);
        assert!(g.pending().is_none());
        g.tick(5_000.0);
        assert_eq!(g.session().round_index(), 1);
        assert!(g.session().rewards().is_empty());
    }

    #[test]
    fn reset_starts_fresh_round() {
        let mut g = game(&[]);
        g.select_level(1, 0.0);
        g.submit_answer(1, 0.0);
        g.tick(700.0);
        assert_eq!(g.session().round_index(), 2);
        g.reset_session(800.0);
        assert!(g.session().rewards().is_empty());
        assert_eq!(g.session().round_index(), 1);
        assert!(g.pending().is_none());
    }

    #[test]
    fn reset_without_level_only_clears() {
        let mut g = game(&[]);
        g.reset_session(0.0);
        assert_eq!(g.session().round_index(), 0);
        g.next_question(0.0);
        assert_eq!(g.session().round_index(), 0);
    }

    #[test]
    fn round_cap_stops_auto_advance_but_not_manual_next() {
        let mut g = game(&[]);
        g.select_level(1, 0.0);
        let mut now = 0.0;
        for _ in 0..TOTAL_ROUNDS {
            g.submit_answer(g.session().target(), now);
            now += CORRECT_ADVANCE_MS;
            g.tick(now);
        }
        assert_eq!(g.session().rewards().len() as u32, TOTAL_ROUNDS);
        assert_eq!(g.session().round_index(), TOTAL_ROUNDS);
        assert_eq!(g.session().feedback(), Feedback::None);
        g.tick(now + 10_000.0);
        assert_eq!(g.session().round_index(), TOTAL_ROUNDS);

        g.rng_mut().push(3);
        g.next_question(now + 10_000.0);
        assert_eq!(g.session().round_index(), TOTAL_ROUNDS + 1);
        assert_eq!(g.session().target(), 4);

        // Past the cap a correct answer still celebrates but builds nothing.
        g.submit_answer(4, now + 10_100.0);
        assert_eq!(g.session().feedback(), Feedback::Correct);
        assert_eq!(g.session().rewards().len() as u32, TOTAL_ROUNDS);
    }

    #[test]
    fn timeout_forces_wrong_and_advances() {
        let mut g = timed_game(5);
        g.select_level(1, 0.0);
        assert_eq!(g.timer().remaining_secs(), Some(5));
        g.tick(4_999.0);
        assert_eq!(g.timer().remaining_secs(), Some(1));
        let shakes = g.session().shake_token();
        g.tick(5_000.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
        assert_eq!(g.session().shake_token(), shakes + 1);
        assert!(!g.timer().is_running());
        assert_eq!(g.sink().played.last(), Some(&Cue::Wrong));

        g.tick(5_600.0);
        assert_eq!(g.session().round_index(), 2);
        assert_eq!(g.session().feedback(), Feedback::None);
        assert_eq!(g.timer().remaining_secs(), Some(5));
    }

    #[test]
    fn wrong_answer_does_not_reset_countdown() {
        let mut g = timed_game(5);
        g.select_level(1, 0.0);
        g.tick(2_000.0);
        g.submit_answer(5, 2_100.0);
        assert_eq!(g.timer().remaining_secs(), Some(3));
        g.tick(5_000.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
        assert_eq!(g.pending().map(|p| p.action), Some(Continuation::StartRound));
    }

    #[test]
    fn correct_answer_cancels_countdown() {
        let mut g = timed_game(5);
        g.select_level(1, 0.0);
        g.submit_answer(g.session().target(), 2_000.0);
        assert!(!g.timer().is_running());
        g.tick(2_700.0);
        assert_eq!(g.session().round_index(), 2);
        // Fresh countdown from 2_700; the old one must not fire at 5_000.
        g.tick(5_000.0);
        assert_eq!(g.session().feedback(), Feedback::None);
        assert_eq!(g.session().round_index(), 2);
        g.tick(7_700.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
    }

    #[test]
    fn turning_timed_mode_off_cancels() {
        let mut g = timed_game(5);
        g.select_level(1, 0.0);
        g.set_timed_mode(false, 1_000.0);
        assert!(!g.timer().is_running());
        g.tick(60_000.0);
        assert_eq!(g.session().feedback(), Feedback::None);
        assert_eq!(g.session().round_index(), 1);
    }

    #[test]
    fn turning_timed_mode_on_arms_current_round() {
        let mut g = game(&[]);
        g.select_level(1, 0.0);
        assert!(!g.timer().is_running());
        g.set_timed_mode(true, 1_000.0);
        assert_eq!(g.timer().remaining_secs(), Some(10));
    }

    #[test]
    fn duration_change_applies_next_round() {
        let mut g = timed_game(10);
        g.select_level(1, 0.0);
        g.set_round_seconds(5);
        assert_eq!(g.timer().remaining_secs(), Some(10));
        g.next_question(100.0);
        assert_eq!(g.timer().remaining_secs(), Some(5));
        g.set_round_seconds(60);
        assert_eq!(g.config().round_seconds, 20);
    }

    #[test]
    fn volume_and_mute_drive_master_gain() {
        let mut g = game(&[]);
        assert_eq!(g.sink().gain, Some(0.8));
        g.set_volume(0.25);
        assert_eq!(g.sink().gain, Some(0.25));
        g.set_muted(true);
        assert_eq!(g.sink().gain, Some(0.0));
        g.set_muted(false);
        g.set_volume(3.0);
        assert_eq!(g.sink().gain, Some(1.0));
    }

    #[test]
    fn apply_config_switches_everything() {
        let mut g = game(&[]);
        g.select_level(2, 0.0);
        g.apply_config(
            GameConfig {
                timed_mode: true,
                round_seconds: 6,
                volume: 0.5,
                muted: true,
            },
            50.0,
        );
        assert_eq!(g.timer().remaining_secs(), Some(6));
        assert_eq!(g.sink().gain, Some(0.0));
    }

    #[test]
    fn final_round_timeout_only_clears_feedback() {
        let mut g = timed_game(5);
        g.select_level(1, 0.0);
        for _ in 1..TOTAL_ROUNDS {
            g.next_question(0.0);
        }
        assert_eq!(g.session().round_index(), TOTAL_ROUNDS);
        g.tick(5_000.0);
        assert_eq!(g.session().feedback(), Feedback::Incorrect);
        assert_eq!(
            g.pending(),
            Some(Pending {
                due_ms: 5_000.0 + WRONG_CLEAR_MS,
                action: Continuation::ClearFeedback,
            })
        );
        g.tick(5_600.0);
        assert_eq!(g.session().round_index(), TOTAL_ROUNDS);
        assert_eq!(g.session().feedback(), Feedback::None);
        assert!(!g.timer().is_running());
    }
}
