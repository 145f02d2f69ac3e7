use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::ensure_positive,
    frame::{Frame, BLACK, WHITE},
    Result,
};

/// Creates an independent random stream for one animation.
///
/// A seed makes the stream reproducible; `None` draws fresh entropy.
pub fn random_stream(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fair coin flip mapped onto the binary intensity range.
pub fn fair_bit<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    if rng.gen::<bool>() {
        WHITE
    } else {
        BLACK
    }
}

/// Grid of independently drawn binary intensities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl NoiseField {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Materializes the field as a frame, replicating each value across channels.
    pub fn to_frame(&self, channels: usize) -> Result<Frame> {
        Frame::from_scalars(self.width, self.height, channels, &self.values)
    }
}

/// Sole source of visual entropy for both frame strategies.
#[derive(Debug, Clone, Copy)]
pub struct NoiseTextureSynthesizer {
    width: usize,
    height: usize,
    channels: usize,
}

impl NoiseTextureSynthesizer {
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        ensure_positive("noise width", width)?;
        ensure_positive("noise height", height)?;
        ensure_positive("channel count", channels)?;
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// Draws a field of `width × height` fair coin flips in row-major order.
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> NoiseField {
        let values = (0..self.width * self.height)
            .map(|_| fair_bit(rng))
            .collect();
        NoiseField {
            width: self.width,
            height: self.height,
            values,
        }
    }

    /// Draws a field and materializes it straight into a frame.
    pub fn synthesize_frame<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Frame> {
        self.synthesize(rng).to_frame(self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_identical_fields() {
        let synth = NoiseTextureSynthesizer::new(64, 32, 3).unwrap();
        let a = synth.synthesize(&mut random_stream(Some(7)));
        let b = synth.synthesize(&mut random_stream(Some(7)));
        let c = synth.synthesize(&mut random_stream(Some(8)));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn values_are_binary_and_roughly_balanced() {
        let synth = NoiseTextureSynthesizer::new(100, 100, 1).unwrap();
        let field = synth.synthesize(&mut random_stream(Some(42)));

        assert!(field.values().iter().all(|&v| v == BLACK || v == WHITE));
        let white = field.values().iter().filter(|&&v| v == WHITE).count();
        let ratio = white as f64 / field.values().len() as f64;
        assert!((ratio - 0.5).abs() < 0.03, "white ratio {ratio}");
    }

    #[test]
    fn materialized_frame_replicates_channels() {
        let synth = NoiseTextureSynthesizer::new(8, 4, 3).unwrap();
        let frame = synth.synthesize_frame(&mut random_stream(Some(1))).unwrap();

        assert!(frame.has_shape(8, 4, 3));
        assert!(frame.is_binary());
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(NoiseTextureSynthesizer::new(0, 4, 3).is_err());
        assert!(NoiseTextureSynthesizer::new(4, 0, 3).is_err());
        assert!(NoiseTextureSynthesizer::new(4, 4, 0).is_err());
    }
}
