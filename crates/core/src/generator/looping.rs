use rayon::prelude::*;

use crate::{
    error::ensure_positive,
    frame::{Frame, FrameWriter},
    mask::TextMask,
    noise::NoiseField,
    CaptchaError, Result,
};

/// Where a loop-strategy pixel takes its value from in the noise field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseSample {
    /// Sampled through the upward-scrolling text offset.
    Foreground { source_y: usize },
    /// Sampled through the downward-scrolling background offset.
    Background { source_y: usize },
}

impl NoiseSample {
    pub fn source_y(self) -> usize {
        match self {
            Self::Foreground { source_y } | Self::Background { source_y } => source_y,
        }
    }
}

/// Closed-form strategy: every frame is a pure function of its index.
///
/// Foreground pixels read the static field at `y + i * speed`, background
/// pixels at `y - i * speed`, both modulo the field height. The field is
/// exactly `cycle_length * scroll_speed` rows tall, so frame `cycle_length`
/// wraps back onto frame `0`.
#[derive(Debug, Clone, Copy)]
pub struct LoopFrameGenerator<'a> {
    mask: &'a TextMask,
    noise: &'a NoiseField,
    scroll_speed: usize,
    cycle_length: usize,
    channels: usize,
}

impl<'a> LoopFrameGenerator<'a> {
    /// Height a noise field must have for the given cycle.
    pub fn noise_height(cycle_length: usize, scroll_speed: usize) -> usize {
        cycle_length * scroll_speed
    }

    pub fn new(
        mask: &'a TextMask,
        noise: &'a NoiseField,
        scroll_speed: usize,
        cycle_length: usize,
        channels: usize,
    ) -> Result<Self> {
        ensure_positive("scroll speed", scroll_speed)?;
        ensure_positive("cycle length", cycle_length)?;
        ensure_positive("channel count", channels)?;
        if noise.width() != mask.width() {
            return Err(CaptchaError::invalid(format!(
                "noise width {} does not match canvas width {}",
                noise.width(),
                mask.width()
            )));
        }
        let expected = Self::noise_height(cycle_length, scroll_speed);
        if noise.height() != expected {
            return Err(CaptchaError::invalid(format!(
                "noise height {} must equal cycle length x scroll speed ({expected})",
                noise.height()
            )));
        }
        Ok(Self {
            mask,
            noise,
            scroll_speed,
            cycle_length,
            channels,
        })
    }

    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// Resolves the noise row that pixel `(x, y)` reads in frame `index`.
    pub fn sample(&self, index: usize, x: usize, y: usize) -> NoiseSample {
        let noise_height = self.noise.height();
        let shift = (index % self.cycle_length) * self.scroll_speed % noise_height;
        let wrapped = y % noise_height;

        if self.mask.is_foreground(x, y) {
            NoiseSample::Foreground {
                source_y: (wrapped + shift) % noise_height,
            }
        } else {
            NoiseSample::Background {
                source_y: (wrapped + noise_height - shift) % noise_height,
            }
        }
    }

    /// Computes frame `index`. Indices at or beyond the cycle wrap around.
    pub fn frame(&self, index: usize) -> Frame {
        let (width, height) = (self.mask.width(), self.mask.height());
        let noise_height = self.noise.height();
        let shift = (index % self.cycle_length) * self.scroll_speed % noise_height;
        let mut writer = FrameWriter::new(width, height, self.channels);

        for y in 0..height {
            let wrapped = y % noise_height;
            let text_y = (wrapped + shift) % noise_height;
            let bg_y = (wrapped + noise_height - shift) % noise_height;
            for x in 0..width {
                let source_y = if self.mask.is_foreground(x, y) {
                    text_y
                } else {
                    bg_y
                };
                debug_assert!(source_y < noise_height);
                writer.push(self.noise.get(x, source_y));
            }
        }

        writer.finish()
    }

    /// Renders frames `0..count` in order.
    pub fn render(&self, count: usize) -> Vec<Frame> {
        (0..count).map(|index| self.frame(index)).collect()
    }

    /// Renders frames `0..count` on a rayon pool of `workers` threads. The
    /// output is identical to [`Self::render`].
    pub fn render_parallel(&self, count: usize, workers: usize) -> Result<Vec<Frame>> {
        if workers <= 1 {
            return Ok(self.render(count));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| {
                CaptchaError::render(format!("failed to build rayon thread pool: {e}"))
            })?;
        Ok(pool.install(|| (0..count).into_par_iter().map(|i| self.frame(i)).collect()))
    }
}
