//! Frame generators that turn a text mask into scrolling noise.
//!
//! Two strategies live behind [`FrameGenerator`]. The loop strategy is
//! stateless and closes into an exact cycle. The recurrence strategy threads
//! the previous frame forward and does not loop.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{frame::Frame, Result};

mod looping;
mod recurrence;

pub use looping::{LoopFrameGenerator, NoiseSample};
pub use recurrence::{PixelSource, RecurrenceFrameGenerator};

/// Selects which frame generator drives an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Closed-form, seamlessly looping animation.
    #[default]
    Loop,
    /// Stateful one-shot animation built frame by frame.
    Recurrence,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loop => f.write_str("loop"),
            Self::Recurrence => f.write_str("recurrence"),
        }
    }
}

/// One interface over both strategies.
#[derive(Debug, Clone, Copy)]
pub enum FrameGenerator<'a> {
    Loop(LoopFrameGenerator<'a>),
    Recurrence(RecurrenceFrameGenerator<'a>),
}

impl FrameGenerator<'_> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Loop(_) => Strategy::Loop,
            Self::Recurrence(_) => Strategy::Recurrence,
        }
    }

    /// Produces frame `index` given the frame before it.
    ///
    /// The loop variant ignores `previous` and the random stream. The
    /// recurrence variant ignores `index` and draws its initial state from
    /// `rng` when `previous` is `None`.
    pub fn next_frame<R: Rng + ?Sized>(
        &self,
        index: usize,
        previous: Option<&Frame>,
        rng: &mut R,
    ) -> Result<Frame> {
        match self {
            Self::Loop(generator) => Ok(generator.frame(index)),
            Self::Recurrence(generator) => match previous {
                Some(previous) => generator.step(previous, rng),
                None => generator.initial_frame(rng),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mask::TextMask,
        noise::{random_stream, NoiseTextureSynthesizer},
    };

    #[test]
    fn strategy_round_trips_through_serde() {
        let json = serde_json::to_string(&Strategy::Recurrence).unwrap();
        assert_eq!(json, "\"recurrence\"");
        let parsed: Strategy = serde_json::from_str("\"loop\"").unwrap();
        assert_eq!(parsed, Strategy::Loop);
    }

    #[test]
    fn dispatches_to_the_selected_strategy() {
        let mask = TextMask::from_cells(4, 4, vec![false; 16]).unwrap();
        let noise = NoiseTextureSynthesizer::new(4, 4, 1)
            .unwrap()
            .synthesize(&mut random_stream(Some(2)));
        let mut rng = random_stream(Some(3));

        let looping =
            FrameGenerator::Loop(LoopFrameGenerator::new(&mask, &noise, 1, 4, 1).unwrap());
        assert_eq!(looping.strategy(), Strategy::Loop);
        let frame = looping.next_frame(4, None, &mut rng).unwrap();
        assert_eq!(frame, looping.next_frame(0, None, &mut rng).unwrap());

        let recurrence =
            FrameGenerator::Recurrence(RecurrenceFrameGenerator::new(&mask, 1, 1).unwrap());
        assert_eq!(recurrence.strategy(), Strategy::Recurrence);
        let first = recurrence.next_frame(0, None, &mut rng).unwrap();
        let second = recurrence.next_frame(1, Some(&first), &mut rng).unwrap();
        for x in 0..4 {
            assert_eq!(second.pixel(x, 3), first.pixel(x, 2));
        }
    }
}
