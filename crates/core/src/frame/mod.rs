use crate::{error::ensure_positive, CaptchaError, Result};

/// Binary intensity used for "on" pixels.
pub const WHITE: u8 = 255;
/// Binary intensity used for "off" pixels.
pub const BLACK: u8 = 0;

/// Fully materialized pixel grid of `width × height × channels` bytes.
///
/// Rows are stored top to bottom, pixels left to right and channels
/// interleaved. Every channel of a pixel carries the same scalar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Builds a frame by broadcasting one scalar per pixel across all channels.
    pub fn from_scalars(
        width: usize,
        height: usize,
        channels: usize,
        scalars: &[u8],
    ) -> Result<Self> {
        ensure_positive("frame width", width)?;
        ensure_positive("frame height", height)?;
        ensure_positive("channel count", channels)?;
        if scalars.len() != width * height {
            return Err(CaptchaError::invalid(format!(
                "expected {} scalars for a {width}x{height} frame, got {}",
                width * height,
                scalars.len()
            )));
        }

        let mut data = Vec::with_capacity(scalars.len() * channels);
        for &value in scalars {
            data.extend(std::iter::repeat(value).take(channels));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the scalar value at `(x, y)`, read from the first channel.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[(y * self.width + x) * self.channels]
    }

    /// Returns every channel of the pixel at `(x, y)`.
    pub fn channels_at(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Raw interleaved bytes, ready for a frame sink.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// `true` when every byte is 0 or 255 and the channels of each pixel agree.
    pub fn is_binary(&self) -> bool {
        self.data.chunks_exact(self.channels).all(|pixel| {
            let value = pixel[0];
            (value == BLACK || value == WHITE) && pixel.iter().all(|&c| c == value)
        })
    }

    pub fn has_shape(&self, width: usize, height: usize, channels: usize) -> bool {
        self.width == width && self.height == height && self.channels == channels
    }
}

/// Write cursor that fills a frame pixel by pixel in row-major order.
pub(crate) struct FrameWriter {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl FrameWriter {
    pub(crate) fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: Vec::with_capacity(width * height * channels),
        }
    }

    pub(crate) fn push(&mut self, value: u8) {
        debug_assert!(value == BLACK || value == WHITE, "non-binary pixel value {value}");
        self.data.extend(std::iter::repeat(value).take(self.channels));
    }

    pub(crate) fn finish(self) -> Frame {
        debug_assert_eq!(self.data.len(), self.width * self.height * self.channels);
        Frame {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data,
        }
    }
}
