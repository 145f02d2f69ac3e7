use rand::Rng;

use crate::{
    error::ensure_positive,
    frame::{Frame, FrameWriter},
    mask::TextMask,
    noise::{fair_bit, NoiseTextureSynthesizer},
    CaptchaError, Result,
};

/// How a recurrence-strategy pixel obtains its next value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSource {
    /// Copy the previous frame's value at `(x, source_y)`.
    Copy { source_y: usize },
    /// The pixel sits on a horizon and receives a fresh fair-coin bit.
    Fresh,
}

/// Stateful strategy: each frame derives only from its predecessor.
///
/// Text pixels pull from `scroll_speed` rows below (content moves up),
/// background pixels from `scroll_speed` rows above (content moves down).
/// A copy never crosses the mask boundary; sources that leave the canvas or
/// land in the other class are re-randomized.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceFrameGenerator<'a> {
    mask: &'a TextMask,
    scroll_speed: usize,
    channels: usize,
}

impl<'a> RecurrenceFrameGenerator<'a> {
    pub fn new(mask: &'a TextMask, scroll_speed: usize, channels: usize) -> Result<Self> {
        ensure_positive("scroll speed", scroll_speed)?;
        ensure_positive("channel count", channels)?;
        Ok(Self {
            mask,
            scroll_speed,
            channels,
        })
    }

    /// Full-canvas noise used as the state before the first step.
    pub fn initial_frame<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Frame> {
        NoiseTextureSynthesizer::new(self.mask.width(), self.mask.height(), self.channels)?
            .synthesize_frame(rng)
    }

    /// Classifies pixel `(x, y)` as a same-class copy or a horizon.
    pub fn classify(&self, x: usize, y: usize) -> PixelSource {
        let mask = self.mask;
        if mask.is_foreground(x, y) {
            let source_y = y + self.scroll_speed;
            if source_y < mask.height() && mask.is_foreground(x, source_y) {
                PixelSource::Copy { source_y }
            } else {
                PixelSource::Fresh
            }
        } else {
            match y.checked_sub(self.scroll_speed) {
                Some(source_y) if !mask.is_foreground(x, source_y) => {
                    PixelSource::Copy { source_y }
                }
                _ => PixelSource::Fresh,
            }
        }
    }

    /// Produces the frame following `previous`. Random bits are drawn in
    /// row-major order, one per horizon pixel.
    pub fn step<R: Rng + ?Sized>(&self, previous: &Frame, rng: &mut R) -> Result<Frame> {
        let (width, height) = (self.mask.width(), self.mask.height());
        if !previous.has_shape(width, height, self.channels) {
            return Err(CaptchaError::invalid(format!(
                "previous frame is {}x{}x{}, expected {width}x{height}x{}",
                previous.width(),
                previous.height(),
                previous.channels(),
                self.channels
            )));
        }

        let mut writer = FrameWriter::new(width, height, self.channels);
        for y in 0..height {
            for x in 0..width {
                let value = match self.classify(x, y) {
                    PixelSource::Copy { source_y } => {
                        debug_assert!(source_y < height);
                        debug_assert_eq!(
                            self.mask.is_foreground(x, source_y),
                            self.mask.is_foreground(x, y),
                            "copy crossed the mask boundary at ({x}, {y})"
                        );
                        previous.pixel(x, source_y)
                    }
                    PixelSource::Fresh => fair_bit(rng),
                };
                writer.push(value);
            }
        }

        Ok(writer.finish())
    }
}
