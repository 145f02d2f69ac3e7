use serde::{Deserialize, Serialize};

use crate::{frame::Frame, CaptchaError, Result};

mod gif_recorder;

pub use gif_recorder::{encode_gif, GifRecorder};

/// Playback options handed to container encoders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Delay between consecutive frames in milliseconds.
    pub frame_delay_ms: u32,
    /// Number of times playback repeats; `None` repeats forever.
    pub repeat: Option<u16>,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            frame_delay_ms: 40,
            repeat: None,
        }
    }
}

/// Shape of the frames a sink is about to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub frame_count: usize,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing indices starting at zero,
/// between one `begin` and one `end`.
pub trait FrameSink {
    fn begin(&mut self, config: SinkConfig) -> Result<()>;
    fn push_frame(&mut self, index: usize, frame: &Frame) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    config: Option<SinkConfig>,
    frames: Vec<Frame>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.config
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, config: SinkConfig) -> Result<()> {
        self.config = Some(config);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, index: usize, frame: &Frame) -> Result<()> {
        if index != self.frames.len() {
            return Err(CaptchaError::invalid(format!(
                "frame {index} pushed out of order, expected {}",
                self.frames.len()
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_enforces_order() {
        let frame = Frame::from_scalars(1, 1, 3, &[255]).unwrap();
        let mut sink = InMemorySink::new();
        sink.begin(SinkConfig {
            width: 1,
            height: 1,
            channels: 3,
            frame_count: 2,
        })
        .unwrap();

        sink.push_frame(0, &frame).unwrap();
        assert!(sink.push_frame(2, &frame).is_err());
        sink.push_frame(1, &frame).unwrap();
        sink.end().unwrap();

        assert!(sink.is_finished());
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.config().map(|c| c.frame_count), Some(2));
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: RecordingSettings = serde_json::from_str(r#"{"repeat": 3}"#).unwrap();
        assert_eq!(settings.frame_delay_ms, 40);
        assert_eq!(settings.repeat, Some(3));
    }
}
