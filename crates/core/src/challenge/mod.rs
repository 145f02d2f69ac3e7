use std::fmt;

use rand::Rng;

use crate::{
    mask::GlyphMaskBuilder,
    record::FrameSink,
    sequence::{AnimationSequence, AnimationSequenceAssembler},
    AppConfig, CaptchaError, Result,
};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Validated, upper-cased text hidden inside a challenge animation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeText(String);

impl ChallengeText {
    /// Accepts non-empty ASCII letters and digits, upper-casing letters.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CaptchaError::invalid("challenge text must not be empty"));
        }
        if let Some(bad) = text.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(CaptchaError::invalid(format!(
                "unsupported character {bad:?} in challenge text"
            )));
        }
        Ok(Self(text.to_ascii_uppercase()))
    }

    /// Draws `length` letters uniformly from `A`-`Z`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(CaptchaError::invalid("challenge length must be > 0"));
        }
        let text = (0..length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a user's answer.
    pub fn matches(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for ChallengeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders challenge text into an animation using one configuration.
#[derive(Debug)]
pub struct ChallengeRenderer {
    config: AppConfig,
    masks: GlyphMaskBuilder,
    assembler: AnimationSequenceAssembler,
}

impl ChallengeRenderer {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let masks = GlyphMaskBuilder::from_font_path_or_builtin(
            config.text.font_path.as_deref(),
            config.canvas.width,
            config.canvas.height,
        )?;
        let assembler = AnimationSequenceAssembler::new(config.canvas, config.animation)?;
        Ok(Self {
            config,
            masks,
            assembler,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds the full sequence in memory.
    pub fn render<R: Rng + ?Sized>(
        &self,
        text: &ChallengeText,
        rng: &mut R,
    ) -> Result<AnimationSequence> {
        let mask = self
            .masks
            .build(text.as_str(), self.config.text.font_size, self.config.text.offset())?;
        self.assembler.assemble(&mask, rng)
    }

    /// Streams frames straight into `sink`, returning the number written.
    pub fn render_into<R, S>(
        &self,
        text: &ChallengeText,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<usize>
    where
        R: Rng + ?Sized,
        S: FrameSink + ?Sized,
    {
        let mask = self
            .masks
            .build(text.as_str(), self.config.text.font_size, self.config.text.offset())?;
        tracing::debug!(
            rasterizer = self.masks.rasterizer_name(),
            coverage = mask.foreground_count(),
            "built text mask"
        );
        self.assembler.assemble_into(&mask, rng, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{noise::random_stream, record::encode_gif};

    #[test]
    fn parses_and_normalizes_text() {
        let text = ChallengeText::parse(" abCde ").unwrap();
        assert_eq!(text.as_str(), "ABCDE");
        assert!(text.matches("abcde"));
        assert!(text.matches(" ABCDE\n"));
        assert!(!text.matches("ABCD"));
    }

    #[test]
    fn rejects_empty_and_unsupported_text() {
        assert!(ChallengeText::parse("").unwrap_err().is_invalid_input());
        assert!(ChallengeText::parse("   ").is_err());
        assert!(ChallengeText::parse("AB CD").is_err());
        assert!(ChallengeText::parse("ÄBC").is_err());
    }

    #[test]
    fn random_text_uses_uppercase_letters() {
        let mut rng = random_stream(Some(10));
        let text = ChallengeText::random(&mut rng, 5).unwrap();
        assert_eq!(text.as_str().len(), 5);
        assert!(text.as_str().chars().all(|c| c.is_ascii_uppercase()));

        let again = ChallengeText::random(&mut random_stream(Some(10)), 5).unwrap();
        assert_eq!(text, again);
        assert!(ChallengeText::random(&mut rng, 0).is_err());
    }

    #[test]
    fn renders_challenge_to_gif() {
        let renderer = ChallengeRenderer::new(AppConfig::loop_defaults()).unwrap();
        let text = ChallengeText::parse("ABCDE").unwrap();

        let sequence = renderer.render(&text, &mut random_stream(Some(4))).unwrap();
        assert_eq!(sequence.len(), 30);

        let bytes = encode_gif(&sequence, &renderer.config().recording).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = AppConfig::loop_defaults();
        config.animation.frame_count = 0;
        assert!(ChallengeRenderer::new(config).is_err());
    }
}
