use std::{fs::File, io::BufWriter, io::Write, path::Path};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame as GifFrame, Rgba, RgbaImage,
};

use super::{FrameSink, RecordingSettings, SinkConfig};
use crate::{frame::Frame, sequence::AnimationSequence, CaptchaError, Result};

/// Collects frames and writes them out as an animated GIF on `end`.
///
/// The container is assembled in memory first, so every write to the
/// underlying writer, including the trailer and the final flush, reports
/// its error to the caller.
pub struct GifRecorder<W: Write> {
    settings: RecordingSettings,
    writer: Option<W>,
    pending: Option<Vec<GifFrame>>,
    frames_written: usize,
}

impl GifRecorder<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: &Path, settings: RecordingSettings) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), settings))
    }
}

impl<W: Write> GifRecorder<W> {
    pub fn new(writer: W, settings: RecordingSettings) -> Self {
        Self {
            settings,
            writer: Some(writer),
            pending: None,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn is_recording(&self) -> bool {
        self.pending.is_some()
    }

    fn repeat(&self) -> Repeat {
        match self.settings.repeat {
            Some(count) => Repeat::Finite(count),
            None => Repeat::Infinite,
        }
    }
}

impl<W: Write> FrameSink for GifRecorder<W> {
    fn begin(&mut self, config: SinkConfig) -> Result<()> {
        if self.writer.is_none() || self.pending.is_some() {
            return Err(CaptchaError::invalid("gif recorder can only be started once"));
        }

        tracing::debug!(
            width = config.width,
            height = config.height,
            frames = config.frame_count,
            "starting gif recording"
        );
        self.pending = Some(Vec::with_capacity(config.frame_count));
        Ok(())
    }

    fn push_frame(&mut self, _index: usize, frame: &Frame) -> Result<()> {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| CaptchaError::invalid("gif recorder has not been started"))?;
        let delay = Delay::from_numer_denom_ms(self.settings.frame_delay_ms, 1);
        pending.push(GifFrame::from_parts(to_rgba(frame)?, 0, 0, delay));
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        let frames = self
            .pending
            .take()
            .ok_or_else(|| CaptchaError::invalid("gif recorder has not been started"))?;
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| CaptchaError::invalid("gif recorder was already finished"))?;

        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.set_repeat(self.repeat())?;
            encoder.encode_frames(frames)?;
            // Dropping the encoder appends the GIF trailer.
        }

        writer.write_all(&bytes)?;
        writer.flush()?;
        tracing::debug!(
            bytes = bytes.len(),
            frames = self.frames_written,
            "finished gif recording"
        );
        Ok(())
    }
}

/// Encodes a finished sequence into GIF bytes.
pub fn encode_gif(sequence: &AnimationSequence, settings: &RecordingSettings) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut recorder = GifRecorder::new(&mut bytes, settings.clone());
        sequence.replay_into(&mut recorder)?;
    }
    Ok(bytes)
}

fn to_rgba(frame: &Frame) -> Result<RgbaImage> {
    let (width, height) = (
        u32::try_from(frame.width()).map_err(|_| CaptchaError::invalid("frame too wide"))?,
        u32::try_from(frame.height()).map_err(|_| CaptchaError::invalid("frame too tall"))?,
    );
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let value = frame.pixel(x as usize, y as usize);
        Rgba([value, value, value, u8::MAX])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_scalar_frames_to_opaque_rgba() {
        let frame = Frame::from_scalars(2, 1, 3, &[0, 255]).unwrap();
        let image = to_rgba(&frame).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn writes_gif_stream() {
        let frame = Frame::from_scalars(4, 2, 3, &[0, 255, 0, 255, 255, 0, 255, 0]).unwrap();
        let mut bytes = Vec::new();
        {
            let mut recorder = GifRecorder::new(&mut bytes, RecordingSettings::default());
            recorder
                .begin(SinkConfig {
                    width: 4,
                    height: 2,
                    channels: 3,
                    frame_count: 2,
                })
                .unwrap();
            assert!(recorder.is_recording());
            recorder.push_frame(0, &frame).unwrap();
            recorder.push_frame(1, &frame).unwrap();
            recorder.end().unwrap();
            assert_eq!(recorder.frames_written(), 2);
            assert!(!recorder.is_recording());
        }

        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3B));
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn reports_write_failures_on_end() {
        let frame = Frame::from_scalars(2, 2, 1, &[0, 255, 255, 0]).unwrap();
        let mut recorder = GifRecorder::new(FullDisk, RecordingSettings::default());
        recorder
            .begin(SinkConfig {
                width: 2,
                height: 2,
                channels: 1,
                frame_count: 1,
            })
            .unwrap();
        recorder.push_frame(0, &frame).unwrap();

        let err = recorder.end().unwrap_err();
        assert!(matches!(err, CaptchaError::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn refuses_frames_before_begin() {
        let frame = Frame::from_scalars(1, 1, 1, &[0]).unwrap();
        let mut recorder = GifRecorder::new(Vec::new(), RecordingSettings::default());
        assert!(recorder.push_frame(0, &frame).is_err());
        assert!(recorder.end().is_err());
    }
}
