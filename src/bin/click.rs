// click - command-line front end for the metronome engine
//
// `play` drives a live session on the default output device; `render`
// writes the same scheduled output to a WAV file for offline inspection.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use metronome_core::{render_session, EngineConfig, PlaybackEngine, SoundStyle};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("click error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "click", about = "Metronome click engine CLI")]
struct Cli {
    /// Path to an engine config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => EngineConfig::load_from_file(path),
            None => EngineConfig::default(),
        };
        match self.command {
            Command::Play(args) => play_command(args, config),
            Command::Render(args) => render_command(args, config),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play clicks on the default output device for a fixed time.
    Play(PlayArgs),
    /// Render a session to a mono 16-bit WAV file.
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
struct TempoArgs {
    /// Tempo in beats per minute (clamped to 30-240)
    #[arg(long, default_value_t = 120)]
    bpm: u32,
    /// Beats per measure (clamped to 1-12)
    #[arg(long, default_value_t = 4)]
    beats: u32,
    /// Click timbre
    #[arg(long, value_enum, default_value_t = StyleArg::Classic)]
    style: StyleArg,
}

#[derive(Args, Debug, Clone)]
struct PlayArgs {
    #[command(flatten)]
    tempo: TempoArgs,
    /// How long to play before stopping (seconds)
    #[arg(long, default_value_t = 10)]
    seconds: u64,
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    #[command(flatten)]
    tempo: TempoArgs,
    /// Length of the rendered session (seconds)
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,
    /// Destination WAV file
    #[arg(long)]
    output: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StyleArg {
    Classic,
    Short,
    Soft,
    Wood,
    Drum,
    Metal,
}

impl From<StyleArg> for SoundStyle {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Classic => SoundStyle::Classic,
            StyleArg::Short => SoundStyle::Short,
            StyleArg::Soft => SoundStyle::Soft,
            StyleArg::Wood => SoundStyle::Wood,
            StyleArg::Drum => SoundStyle::Drum,
            StyleArg::Metal => SoundStyle::Metal,
        }
    }
}

fn play_command(args: PlayArgs, config: EngineConfig) -> Result<()> {
    let mut engine = PlaybackEngine::new(config);
    engine
        .start(args.tempo.bpm, args.tempo.beats, args.tempo.style.into())
        .context("failed to start playback")?;
    println!(
        "Playing {} bpm, {} beats/measure ({:?}) for {} s",
        args.tempo.bpm, args.tempo.beats, args.tempo.style, args.seconds
    );
    thread::sleep(Duration::from_secs(args.seconds));
    engine.stop();
    Ok(())
}

fn render_command(args: RenderArgs, config: EngineConfig) -> Result<()> {
    let samples = render_session(
        args.tempo.bpm,
        args.tempo.beats,
        args.tempo.style.into(),
        args.seconds,
        &config,
    );

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("failed to create {:?}", args.output))?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    println!("Wrote {:?}", args.output);
    Ok(())
}
