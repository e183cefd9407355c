//! Presentation projection: turns game state into plain data the DOM layer
//! paints. No gameplay decisions are made here.

use crate::game::Game;
use crate::level;
use crate::rng::RandomSource;
use crate::session::{Feedback, TOTAL_ROUNDS};
use crate::tone::CueSink;

// --- UI strings ---------------------------------------------------------------

pub const TITLE: &str = "شهر اعداد";
pub const SUBTITLE: &str = "بازی تمرینی شمارش ویژهٔ پایهٔ دوم و سوم";
pub const INTRO_HEADING: &str = "به شهر اعداد خوش آمدید";
pub const INTRO_BODY: &str = "یک سطح را انتخاب کن. عددی نمایش داده می‌شود؛ گزینهٔ درست را انتخاب کن تا یک ساختمان رنگی جدید ساخته شود! با هر پاسخ درست، صدای جشن پخش می‌شود و پیشرفت تو در نوار بالا نشان داده می‌شود.";
pub const INTRO_WORKERS: &str = "کارگرهای کوچک آماده‌اند تا ساختمان‌های تازه بسازند!";
pub const CITY_HEADING: &str = "شهر رنگی تو";
pub const EMPTY_CITY: &str = "هنوز ساختمانی ساخته نشده — جواب درست بده تا بسازیم! 🎉";
pub const TILE_BADGE: &str = "+۱ ساختمان";
pub const PROGRESS_LABEL: &str = "پیشرفت";
pub const QUESTION_PROMPT: &str = "عدد را بخوان و گزینهٔ درست را انتخاب کن";
pub const CORRECT_BANNER: &str = "آفرین! یک ساختمان جدید ساخته شد 🎊";
pub const WRONG_BANNER: &str = "دوباره تلاش کن ✋";
pub const RESTART_LABEL: &str = "شروع دوباره";
pub const NEXT_LABEL: &str = "سؤال بعدی";
pub const TIMED_LABEL: &str = "زمان‌دار";
pub const MUTE_LABEL: &str = "بی‌صدا";
pub const FOOTER: &str = "ساخته شده برای تمرین شمارش | وب و موبایل";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Idle,
    Happy,
    Sad,
}

impl From<Feedback> for Mood {
    fn from(f: Feedback) -> Self {
        match f {
            Feedback::None => Mood::Idle,
            Feedback::Correct => Mood::Happy,
            Feedback::Incorrect => Mood::Sad,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelButton {
    pub id: u8,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub value: u32,
    pub highlighted: bool, // the right answer while the success flash is up
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: u64,
    pub color: String,
    pub height_px: u32,
    pub windows: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    pub remaining_secs: u32,
    pub fraction: f64,
}

/// Everything the page shows, in one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionView {
    pub levels: Vec<LevelButton>,
    pub playing: bool,
    pub target: u32,
    pub choices: Vec<Choice>,
    pub tiles: Vec<Tile>,
    pub progress: f64,
    pub progress_label: String,
    pub mood: Mood,
    pub banner: Option<&'static str>,
    pub shaking: bool,
    pub shake_token: u32,
    pub countdown: Option<Countdown>,
    pub timed_mode: bool,
    pub round_seconds: u32,
    pub volume: f32,
    pub muted: bool,
}

pub fn project<R: RandomSource, S: CueSink>(game: &Game<R, S>) -> SessionView {
    let session = game.session();
    let config = game.config();
    let active = session.level();
    let feedback = session.feedback();
    let target = session.target();

    let choices = active
        .map(|lvl| {
            (1..=lvl.answer_range)
                .map(|value| Choice {
                    value,
                    highlighted: feedback == Feedback::Correct && value == target,
                })
                .collect()
        })
        .unwrap_or_default();

    let countdown = game.timer().remaining_secs().map(|remaining_secs| Countdown {
        remaining_secs,
        fraction: remaining_secs as f64 / config.round_seconds.max(1) as f64,
    });

    SessionView {
        levels: level::levels()
            .iter()
            .map(|l| LevelButton {
                id: l.id,
                label: l.label,
                active: active.is_some_and(|a| a.id == l.id),
            })
            .collect(),
        playing: active.is_some(),
        target,
        choices,
        tiles: session
            .rewards()
            .iter()
            .map(|r| Tile {
                id: r.id.0,
                color: r.css_color(),
                height_px: r.height_px,
                windows: r.window_count,
            })
            .collect(),
        progress: session.progress(),
        progress_label: format!(
            "{} / {}",
            session.round_index().min(TOTAL_ROUNDS),
            TOTAL_ROUNDS
        ),
        mood: feedback.into(),
        banner: match feedback {
            Feedback::Correct => Some(CORRECT_BANNER),
            Feedback::Incorrect => Some(WRONG_BANNER),
            Feedback::None => None,
        },
        shaking: feedback == Feedback::Incorrect,
        shake_token: session.shake_token(),
        countdown,
        timed_mode: config.timed_mode,
        round_seconds: config.round_seconds,
        volume: config.volume,
        muted: config.muted,
    }
}

// --- Avatar -------------------------------------------------------------------

/// Mouth path and eye offset for each mood.
fn face(mood: Mood) -> (&'static str, i32) {
    match mood {
        Mood::Idle => ("M18 30 Q24 34 30 30", 0),
        Mood::Happy => ("M16 28 Q24 38 32 28", -1),
        Mood::Sad => ("M16 34 Q24 26 32 34", 1),
    }
}

/// Inline SVG of the little worker kid.
pub fn avatar_svg(mood: Mood, size: u32) -> String {
    let (mouth, eye_dy) = face(mood);
    let eye_y = 22 + eye_dy;
    format!(
        concat!(
            "<svg viewBox='0 0 48 48' width='{size}' height='{size}' class='nc-avatar'>",
            "<defs><linearGradient id='nc-skin' x1='0' y1='0' x2='0' y2='1'>",
            "<stop offset='0%' stop-color='#FFD6A0'/><stop offset='100%' stop-color='#FFC38B'/>",
            "</linearGradient></defs>",
            "<g class='nc-float'>",
            "<circle cx='24' cy='24' r='16' fill='url(#nc-skin)' stroke='#E0A56B'/>",
            "<path d='M10 18 C14 8, 34 8, 38 18 L38 16 C34 10, 14 10, 10 16 Z' fill='#3B2A1A'/>",
            "<circle cx='18' cy='{eye_y}' r='2' fill='#1F2937'/>",
            "<circle cx='30' cy='{eye_y}' r='2' fill='#1F2937'/>",
            "<circle cx='14' cy='26' r='1.6' fill='#FCA5A5' opacity='0.7'/>",
            "<circle cx='34' cy='26' r='1.6' fill='#FCA5A5' opacity='0.7'/>",
            "<path d='{mouth}' stroke='#1F2937' stroke-width='2' fill='none' stroke-linecap='round'/>",
            "<g class='nc-tilt'>",
            "<path d='M12 14 Q24 6 36 14 L36 18 L12 18 Z' fill='#F59E0B' stroke='#C2410C'/>",
            "<rect x='20' y='10' width='8' height='6' rx='2' fill='#FDE68A' stroke='#C2410C'/>",
            "</g></g></svg>"
        ),
        size = size,
        eye_y = eye_y,
        mouth = mouth,
    )
}

// --- Tilt ---------------------------------------------------------------------

pub const TILT_MAX_DEG: f64 = 12.0;
pub const TILT_REST: &str = "perspective(800px) rotateX(0deg) rotateY(0deg)";

/// Hover tilt for a reward tile, from the pointer position normalised to the
/// tile box (`0..=1` on both axes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
    pub glare_x_pct: f64,
    pub glare_y_pct: f64,
}

impl Tilt {
    pub fn at(px: f64, py: f64, max_deg: f64) -> Self {
        let px = px.clamp(0.0, 1.0);
        let py = py.clamp(0.0, 1.0);
        Self {
            rotate_x_deg: (py - 0.5) * max_deg,
            rotate_y_deg: (0.5 - px) * max_deg,
            glare_x_pct: px * 100.0,
            glare_y_pct: py * 100.0,
        }
    }

    pub fn transform(&self) -> String {
        format!(
            "perspective(800px) rotateX({:.2}deg) rotateY({:.2}deg) translateZ(0)",
            self.rotate_x_deg, self.rotate_y_deg
        )
    }

    pub fn glare(&self) -> String {
        format!(
            "radial-gradient(circle at {:.1}% {:.1}%, rgba(255,255,255,0.35), transparent 40%)",
            self.glare_x_pct, self.glare_y_pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::SequenceRandom;
    use crate::tone::RecordingSink;

    fn game() -> Game<SequenceRandom, RecordingSink> {
        Game::new(
            GameConfig::default(),
            SequenceRandom::new([2]),
            RecordingSink::default(),
        )
    }

    #[test]
    fn intro_before_level_selected() {
        let v = project(&game());
        assert!(!v.playing);
        assert!(v.choices.is_empty());
        assert_eq!(v.levels.len(), 3);
        assert!(v.levels.iter().all(|b| !b.active));
        assert_eq!(v.progress_label, "0 / 10");
        assert_eq!(v.mood, Mood::Idle);
    }

    #[test]
    fn choices_and_highlight_follow_state() {
        let mut g = game();
        g.select_level(1, 0.0);
        let v = project(&g);
        assert!(v.playing);
        assert_eq!(v.target, 3);
        assert_eq!(
            v.choices.iter().map(|c| c.value).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(v.levels[0].active);
        assert!(v.choices.iter().all(|c| !c.highlighted));

        g.submit_answer(3, 10.0);
        let v = project(&g);
        assert_eq!(v.mood, Mood::Happy);
        assert_eq!(v.banner, Some(CORRECT_BANNER));
        assert_eq!(v.tiles.len(), 1);
        let lit: Vec<u32> = v
            .choices
            .iter()
            .filter(|c| c.highlighted)
            .map(|c| c.value)
            .collect();
        assert_eq!(lit, vec![3]);
        assert_eq!(v.progress_label, "1 / 10");
    }

    #[test]
    fn wrong_answer_shakes_and_saddens() {
        let mut g = game();
        g.select_level(1, 0.0);
        g.submit_answer(1, 10.0);
        let v = project(&g);
        assert!(v.shaking);
        assert_eq!(v.mood, Mood::Sad);
        assert_eq!(v.banner, Some(WRONG_BANNER));
        assert_eq!(v.shake_token, 1);
    }

    #[test]
    fn countdown_fraction() {
        let mut g = game();
        g.set_round_seconds(5);
        g.set_timed_mode(true, 0.0);
        g.select_level(1, 0.0);
        g.tick(2_000.0);
        let c = project(&g).countdown.unwrap();
        assert_eq!(c.remaining_secs, 3);
        assert!((c.fraction - 0.6).abs() < 1e-9);
    }

    #[test]
    fn avatar_reflects_mood() {
        let happy = avatar_svg(Mood::Happy, 72);
        assert!(happy.contains("M16 28 Q24 38 32 28"));
        assert!(happy.contains("cy='21'"));
        let sad = avatar_svg(Mood::Sad, 48);
        assert!(sad.contains("M16 34 Q24 26 32 34"));
        assert!(sad.contains("width='48'"));
    }

    #[test]
    fn tilt_maps_corners() {
        let t = Tilt::at(0.0, 1.0, TILT_MAX_DEG);
        assert_eq!(t.rotate_x_deg, 6.0);
        assert_eq!(t.rotate_y_deg, 6.0);
        let centre = Tilt::at(0.5, 0.5, TILT_MAX_DEG);
        assert_eq!(centre.rotate_x_deg, 0.0);
        assert!(centre.transform().contains("rotateX(0.00deg)"));
        assert!(Tilt::at(0.25, 0.75, 12.0).glare().contains("25.0% 75.0%"));
    }
}
