use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::ensure_positive, generator::Strategy, record::RecordingSettings, CaptchaError, Result,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub text: TextConfig,
    pub animation: AnimationConfig,
    pub challenge: ChallengeConfig,
    pub recording: RecordingSettings,
}

impl AppConfig {
    /// Seamlessly looping 320x120 GIF challenge.
    pub fn loop_defaults() -> Self {
        Self::default()
    }

    /// Long one-shot 512x168 animation built by recurrence.
    pub fn recurrence_defaults() -> Self {
        Self {
            canvas: CanvasConfig {
                width: 512,
                height: 168,
                channels: 3,
            },
            text: TextConfig {
                font_size: 140.0,
                offset_x: 40,
                offset_y: 10,
                ..TextConfig::default()
            },
            animation: AnimationConfig {
                strategy: Strategy::Recurrence,
                frame_count: 300,
                scroll_speed: 1,
                ..AnimationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Preset for the given strategy.
    pub fn defaults_for(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Loop => Self::loop_defaults(),
            Strategy::Recurrence => Self::recurrence_defaults(),
        }
    }

    /// Reads a JSON document; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Rejects parameter combinations that cannot produce a valid animation.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("canvas width", self.canvas.width)?;
        ensure_positive("canvas height", self.canvas.height)?;
        ensure_positive("channel count", self.canvas.channels)?;
        if !self.text.font_size.is_finite() || self.text.font_size <= 0.0 {
            return Err(CaptchaError::invalid("font size must be > 0"));
        }
        ensure_positive("challenge length", self.challenge.length)?;
        self.animation.validate()
    }
}

/// Pixel dimensions shared by the mask and every frame of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 120,
            channels: 3,
        }
    }
}

/// Font and placement of the hidden text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// TrueType font; the built-in bitmap font is used when absent or unreadable.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl TextConfig {
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 75.0,
            offset_x: 15,
            offset_y: 22,
        }
    }
}

/// Frame generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub strategy: Strategy,
    pub frame_count: usize,
    /// Frames per loop cycle; only the loop strategy uses it.
    pub cycle_length: usize,
    /// Rows shifted per frame.
    pub scroll_speed: usize,
    /// Threads used to render loop frames.
    pub workers: usize,
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("frame count", self.frame_count)?;
        ensure_positive("scroll speed", self.scroll_speed)?;
        ensure_positive("worker count", self.workers)?;
        if self.strategy == Strategy::Loop {
            ensure_positive("cycle length", self.cycle_length)?;
            if self.frame_count % self.cycle_length != 0 {
                return Err(CaptchaError::invalid(format!(
                    "frame count {} must be a multiple of the cycle length {}",
                    self.frame_count, self.cycle_length
                )));
            }
        }
        Ok(())
    }

    /// Rows in the static noise field of the loop strategy.
    pub fn noise_height(&self) -> usize {
        self.cycle_length * self.scroll_speed
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Loop,
            frame_count: 30,
            cycle_length: 30,
            scroll_speed: 2,
            workers: 1,
        }
    }
}

/// Shape of randomly drawn challenge text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub length: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self { length: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        let looping = AppConfig::loop_defaults();
        looping.validate().unwrap();
        assert_eq!(looping.animation.noise_height(), 60);

        let recurrence = AppConfig::recurrence_defaults();
        recurrence.validate().unwrap();
        assert_eq!(recurrence.canvas.width, 512);
        assert_eq!(recurrence.animation.strategy, Strategy::Recurrence);
        assert_eq!(AppConfig::defaults_for(Strategy::Recurrence), recurrence);
    }

    #[test]
    fn presets_use_builtin_font() {
        assert_eq!(AppConfig::loop_defaults().text.font_path, None);
        assert_eq!(AppConfig::recurrence_defaults().text.font_path, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"animation": {"strategy": "recurrence", "frame_count": 12}, "canvas": {"width": 64}}"#,
        )
        .unwrap();

        assert_eq!(config.animation.strategy, Strategy::Recurrence);
        assert_eq!(config.animation.frame_count, 12);
        assert_eq!(config.animation.scroll_speed, 2);
        assert_eq!(config.canvas.width, 64);
        assert_eq!(config.canvas.height, 120);
        assert_eq!(config.recording.frame_delay_ms, 40);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut config = AppConfig::loop_defaults();
        config.animation.scroll_speed = 0;
        assert!(config.validate().unwrap_err().is_invalid_input());

        let mut config = AppConfig::loop_defaults();
        config.animation.frame_count = 45;
        assert!(config.validate().is_err());

        let mut config = AppConfig::loop_defaults();
        config.animation.frame_count = 60;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::loop_defaults();
        config.canvas.height = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::loop_defaults();
        config.text.font_size = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn recurrence_ignores_cycle_length() {
        let mut config = AppConfig::recurrence_defaults();
        config.animation.cycle_length = 7;
        assert!(config.validate().is_ok());
    }
}
