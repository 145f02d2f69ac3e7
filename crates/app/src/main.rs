use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use motion_captcha_core::{
    random_stream, AppConfig, ChallengeRenderer, ChallengeText, GifRecorder, Strategy,
};
use tracing_subscriber::EnvFilter;

fn main() -> motion_captcha_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            text,
            output,
            options,
        } => run_render(&text, &output, &options),
        Commands::Challenge { output, options } => run_challenge(&output, &options),
    }
}

fn run_render(
    text: &str,
    output: &Path,
    options: &RenderOptions,
) -> motion_captcha_core::Result<()> {
    let text = ChallengeText::parse(text)?;
    let config = options.resolve_config()?;
    tracing::info!(?output, strategy = %config.animation.strategy, "rendering challenge");
    write_gif(config, &text, output, options.seed)
}

fn run_challenge(output: &Path, options: &RenderOptions) -> motion_captcha_core::Result<()> {
    let config = options.resolve_config()?;
    let mut rng = random_stream(options.seed);
    let text = ChallengeText::random(&mut rng, config.challenge.length)?;
    tracing::info!(answer = %text, ?output, "generated challenge");
    write_gif(config, &text, output, options.seed.map(|seed| seed.wrapping_add(1)))
}

fn write_gif(
    config: AppConfig,
    text: &ChallengeText,
    output: &Path,
    seed: Option<u64>,
) -> motion_captcha_core::Result<()> {
    let renderer = ChallengeRenderer::new(config)?;
    let mut recorder = GifRecorder::create(output, renderer.config().recording.clone())?;
    let written = renderer.render_into(text, &mut random_stream(seed), &mut recorder)?;
    tracing::info!(frames = written, ?output, "wrote animation");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Motion-perception captcha renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the given text into an animated GIF.
    Render {
        /// Text to hide in the noise (letters and digits).
        #[arg(short, long)]
        text: String,
        /// Output path for the GIF.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        options: RenderOptions,
    },
    /// Draw random challenge text, log it and render it.
    Challenge {
        /// Output path for the GIF.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        options: RenderOptions,
    },
}

#[derive(clap::Args, Debug)]
struct RenderOptions {
    /// JSON configuration file; defaults to the preset of the chosen strategy.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Frame generation strategy.
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Number of frames to render.
    #[arg(short, long)]
    frames: Option<usize>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// TrueType font used to draw the text.
    #[arg(long)]
    font: Option<PathBuf>,
}

impl RenderOptions {
    fn resolve_config(&self) -> motion_captcha_core::Result<AppConfig> {
        let strategy = self.strategy.map(Strategy::from);
        let mut config = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::defaults_for(strategy.unwrap_or_default()),
        };
        if let Some(strategy) = strategy {
            config.animation.strategy = strategy;
        }
        if let Some(frames) = self.frames {
            config.animation.frame_count = frames;
        }
        if let Some(font) = &self.font {
            config.text.font_path = Some(font.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Loop,
    Recurrence,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Loop => Strategy::Loop,
            StrategyArg::Recurrence => Strategy::Recurrence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_command() {
        let cli = Cli::try_parse_from([
            "motion-captcha",
            "render",
            "--text",
            "ABCDE",
            "--output",
            "out.gif",
            "--strategy",
            "recurrence",
            "--frames",
            "12",
            "--seed",
            "3",
        ])
        .unwrap();

        let Commands::Render { text, options, .. } = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(text, "ABCDE");
        let config = options.resolve_config().unwrap();
        assert_eq!(config.animation.strategy, Strategy::Recurrence);
        assert_eq!(config.animation.frame_count, 12);
        assert_eq!(config.canvas.width, 512);
    }

    #[test]
    fn rejects_loop_frames_off_cycle() {
        let cli = Cli::try_parse_from([
            "motion-captcha",
            "challenge",
            "--output",
            "out.gif",
            "--frames",
            "7",
        ])
        .unwrap();

        let Commands::Challenge { options, .. } = cli.command else {
            panic!("expected challenge command");
        };
        assert!(options.resolve_config().is_err());
    }
}
