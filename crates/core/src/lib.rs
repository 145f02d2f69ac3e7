//! Core library for motion-perception captchas.
//!
//! Text is hidden inside scrolling black and white noise: pixels covered by
//! the glyphs scroll one way, everything else scrolls the other, so the text
//! is only visible while the animation plays. Each module owns one stage of
//! that pipeline (mask rasterization, noise synthesis, frame generation,
//! sequencing and encoding).

pub mod challenge;
pub mod config;
pub mod error;
pub mod frame;
pub mod generator;
pub mod mask;
pub mod noise;
pub mod record;
pub mod sequence;

pub use challenge::{ChallengeRenderer, ChallengeText};
pub use config::{AnimationConfig, AppConfig, CanvasConfig, ChallengeConfig, TextConfig};
pub use error::{CaptchaError, Result};
pub use frame::Frame;
pub use generator::{FrameGenerator, LoopFrameGenerator, RecurrenceFrameGenerator, Strategy};
pub use mask::{GlyphMaskBuilder, TextMask, TextRasterizer};
pub use noise::{random_stream, NoiseField, NoiseTextureSynthesizer};
pub use record::{encode_gif, FrameSink, GifRecorder, InMemorySink, RecordingSettings};
pub use sequence::{AnimationSequence, AnimationSequenceAssembler};
