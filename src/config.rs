//! Player-adjustable settings (timed mode, countdown length, sound).

use crate::error::ConfigError;
use crate::timer::{DEFAULT_ROUND_SECS, MAX_ROUND_SECS, MIN_ROUND_SECS};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub timed_mode: bool,
    pub round_seconds: u32,
    pub volume: f32,
    pub muted: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timed_mode: false,
            round_seconds: DEFAULT_ROUND_SECS,
            volume: 0.8,
            muted: false,
        }
    }
}

impl GameConfig {
    /// Clamp every field into its legal range (slider input path).
    pub fn sanitized(mut self) -> Self {
        self.round_seconds = self.round_seconds.clamp(MIN_ROUND_SECS, MAX_ROUND_SECS);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Strict check used for documents supplied by the embedding page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_ROUND_SECS..=MAX_ROUND_SECS).contains(&self.round_seconds) {
            return Err(ConfigError::RoundSeconds(self.round_seconds));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Volume(self.volume));
        }
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn sanitize_clamps() {
        let cfg = GameConfig {
            timed_mode: true,
            round_seconds: 99,
            volume: f32::NAN,
            muted: false,
        }
        .sanitized();
        assert_eq!(cfg.round_seconds, 20);
        assert_eq!(cfg.volume, 0.0);
        assert_eq!(
            GameConfig {
                round_seconds: 1,
                ..GameConfig::default()
            }
            .sanitized()
            .round_seconds,
            5
        );
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let bad = GameConfig {
            round_seconds: 30,
            ..GameConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::RoundSeconds(30))));
        let loud = GameConfig {
            volume: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(loud.validate(), Err(ConfigError::Volume(_))));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn parses_partial_json() {
        let cfg = GameConfig::from_json(r#"{"timed_mode": true, "round_seconds": 7}"#).unwrap();
        assert!(cfg.timed_mode);
        assert_eq!(cfg.round_seconds, 7);
        assert_eq!(cfg.volume, 0.8);
        assert!(GameConfig::from_json(r#"{"round_seconds": 3}"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }
}
