//! Level catalog. Three fixed difficulty levels with growing answer ranges; the
//! table is immutable and looked up by id.

/// Level descriptor (immutable).
#[derive(Debug, PartialEq)]
pub struct Level {
    pub id: u8,
    pub label: &'static str,
    pub answer_range: u32,   // answers are 1..=answer_range
    pub workers: u32,        // little workers shown on the intro card
    pub chord_root_hz: f32,  // root of the celebration triad
}

pub static LEVELS: [Level; 3] = [
    Level {
        id: 1,
        label: "سطح ۱",
        answer_range: 5,
        workers: 5,
        chord_root_hz: 523.25, // C5
    },
    Level {
        id: 2,
        label: "سطح ۲",
        answer_range: 10,
        workers: 8,
        chord_root_hz: 587.33, // D5
    },
    Level {
        id: 3,
        label: "سطح ۳",
        answer_range: 20,
        workers: 10,
        chord_root_hz: 659.25, // E5
    },
];

pub fn levels() -> &'static [Level] {
    &LEVELS
}

/// Look up a level by id; unknown ids yield `None`.
pub fn find(id: u8) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.id == id)
}
