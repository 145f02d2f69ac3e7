use rand::Rng;

use crate::{
    config::{AnimationConfig, CanvasConfig},
    frame::Frame,
    generator::{FrameGenerator, LoopFrameGenerator, RecurrenceFrameGenerator, Strategy},
    mask::TextMask,
    noise::NoiseTextureSynthesizer,
    record::{FrameSink, SinkConfig},
    CaptchaError, Result,
};

/// Ordered, finite list of frames sharing one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSequence {
    strategy: Strategy,
    frames: Vec<Frame>,
}

impl AnimationSequence {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// `true` when playing the last frame followed by the first is seamless.
    pub fn loops(&self) -> bool {
        self.strategy == Strategy::Loop
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Hands every frame, in order, to `sink`.
    pub fn replay_into<S: FrameSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let Some(first) = self.frames.first() else {
            return Err(CaptchaError::invalid("cannot replay an empty sequence"));
        };
        sink.begin(SinkConfig {
            width: first.width(),
            height: first.height(),
            channels: first.channels(),
            frame_count: self.frames.len(),
        })?;
        for (index, frame) in self.frames.iter().enumerate() {
            sink.push_frame(index, frame)?;
        }
        sink.end()
    }
}

/// Drives a frame generator for a fixed number of frames.
#[derive(Debug, Clone, Copy)]
pub struct AnimationSequenceAssembler {
    canvas: CanvasConfig,
    animation: AnimationConfig,
}

impl AnimationSequenceAssembler {
    /// Validates every parameter up front so no partial work is ever done.
    pub fn new(canvas: CanvasConfig, animation: AnimationConfig) -> Result<Self> {
        if canvas.width == 0 || canvas.height == 0 || canvas.channels == 0 {
            return Err(CaptchaError::invalid("canvas dimensions must be > 0"));
        }
        animation.validate()?;
        Ok(Self { canvas, animation })
    }

    pub fn frame_count(&self) -> usize {
        self.animation.frame_count
    }

    pub fn strategy(&self) -> Strategy {
        self.animation.strategy
    }

    /// Generates the full sequence in memory.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        mask: &TextMask,
        rng: &mut R,
    ) -> Result<AnimationSequence> {
        self.ensure_canvas(mask)?;
        let frames = match self.animation.strategy {
            Strategy::Loop => self.loop_frames(mask, rng)?,
            Strategy::Recurrence => {
                let mut frames = Vec::with_capacity(self.animation.frame_count);
                self.drive(mask, rng, |_, frame| {
                    frames.push(frame.clone());
                    Ok(())
                })?;
                frames
            }
        };

        tracing::debug!(
            strategy = %self.animation.strategy,
            frames = frames.len(),
            "assembled animation sequence"
        );
        Ok(AnimationSequence {
            strategy: self.animation.strategy,
            frames,
        })
    }

    /// Generates frames one at a time and streams them into `sink` without
    /// keeping the whole sequence in memory.
    pub fn assemble_into<R, S>(&self, mask: &TextMask, rng: &mut R, sink: &mut S) -> Result<usize>
    where
        R: Rng + ?Sized,
        S: FrameSink + ?Sized,
    {
        self.ensure_canvas(mask)?;
        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            channels: self.canvas.channels,
            frame_count: self.animation.frame_count,
        })?;
        let written = self.drive(mask, rng, |index, frame| sink.push_frame(index, frame))?;
        sink.end()?;
        Ok(written)
    }

    fn ensure_canvas(&self, mask: &TextMask) -> Result<()> {
        if mask.width() != self.canvas.width || mask.height() != self.canvas.height {
            return Err(CaptchaError::invalid(format!(
                "mask is {}x{}, canvas is {}x{}",
                mask.width(),
                mask.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }
        Ok(())
    }

    /// Loop frames, split across workers when configured.
    fn loop_frames<R: Rng + ?Sized>(&self, mask: &TextMask, rng: &mut R) -> Result<Vec<Frame>> {
        let noise = NoiseTextureSynthesizer::new(
            self.canvas.width,
            self.animation.noise_height(),
            self.canvas.channels,
        )?
        .synthesize(rng);
        let generator = LoopFrameGenerator::new(
            mask,
            &noise,
            self.animation.scroll_speed,
            self.animation.cycle_length,
            self.canvas.channels,
        )?;
        generator.render_parallel(self.animation.frame_count, self.animation.workers)
    }

    /// Runs the selected generator sequentially, threading the previous frame.
    fn drive<R, F>(&self, mask: &TextMask, rng: &mut R, mut emit: F) -> Result<usize>
    where
        R: Rng + ?Sized,
        F: FnMut(usize, &Frame) -> Result<()>,
    {
        let channels = self.canvas.channels;
        let speed = self.animation.scroll_speed;
        let noise;
        let generator = match self.animation.strategy {
            Strategy::Loop => {
                noise = NoiseTextureSynthesizer::new(
                    self.canvas.width,
                    self.animation.noise_height(),
                    channels,
                )?
                .synthesize(rng);
                FrameGenerator::Loop(LoopFrameGenerator::new(
                    mask,
                    &noise,
                    speed,
                    self.animation.cycle_length,
                    channels,
                )?)
            }
            Strategy::Recurrence => {
                FrameGenerator::Recurrence(RecurrenceFrameGenerator::new(mask, speed, channels)?)
            }
        };

        let mut previous: Option<Frame> = None;
        for index in 0..self.animation.frame_count {
            let frame = generator.next_frame(index, previous.as_ref(), rng)?;
            emit(index, &frame)?;
            previous = Some(frame);
        }
        Ok(self.animation.frame_count)
    }
}
