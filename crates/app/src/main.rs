use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use resonance_engine_core::{
    embed, extract, tone_window, EngineConfig, FeatureRecord, ResonanceEngine, SessionEngine,
    SignalBand, SignalSource,
};
use tracing_subscriber::EnvFilter;

fn main() -> resonance_engine_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            frequency,
            windows,
            export,
        } => run_live(frequency, windows, export.as_deref()),
        Commands::Stego { message } => run_stego(&message),
        Commands::Voiceprint => run_voiceprint(),
    }
}

/// Drives a short synthetic capture session through the paced engine and
/// optionally exports the evolution trail.
fn run_live(
    frequency: f32,
    windows: u32,
    export: Option<&std::path::Path>,
) -> resonance_engine_core::Result<()> {
    tracing::info!(frequency, windows, "starting live session");

    let session = SessionEngine::new();
    let handle = session.start()?;
    let capture = session.config().capture.clone();

    for step in 0..windows {
        // A slow wobble gives the coherence tracker something to judge.
        let tone = frequency + (step as f32 * 0.7).sin() * 5.0;
        let window = tone_window(tone, 0.8, capture.window_size, capture.sample_rate);
        let record = session.push_window(&window)?;

        let phase = handle.phase()?;
        if let Some(state) = handle.classify_latest()? {
            tracing::info!(
                frequency = record.frequency,
                coherence = record.coherence,
                ?phase,
                emotional = ?state.emotional,
                mental = ?state.mental,
                sentiment = ?state.sentiment.label,
                "window analysed"
            );
        }

        std::thread::sleep(Duration::from_millis(
            capture.min_process_interval_ms + 10,
        ));
    }

    if let Some(path) = export {
        std::fs::write(path, handle.evolution_json()?)?;
        tracing::info!(?path, "evolution log exported");
    }

    Ok(())
}

/// Round-trips a message through the frequency-bit codec over a synthetic
/// carrier sequence.
fn run_stego(message: &str) -> resonance_engine_core::Result<()> {
    let mut source = SignalSource::with_seed(7);
    let records: Vec<FeatureRecord> = (0..message.len() * 8)
        .map(|step| {
            let reading = source.sample(SignalBand::Synthetic);
            source.lift(&reading, step as f64 * 0.05)
        })
        .collect();

    let carrier = embed(message, &records);
    let recovered = extract(&carrier, Some(message.len()));

    tracing::info!(
        embedded = message,
        recovered = %recovered,
        records = carrier.len(),
        "steganography round trip"
    );
    Ok(())
}

/// Enrolls a voiceprint from a steady synthetic tone and checks it against
/// itself and against a shifted impostor.
fn run_voiceprint() -> resonance_engine_core::Result<()> {
    let mut engine = ResonanceEngine::with_config(EngineConfig::offline());
    let capture = engine.config().capture.clone();

    for _ in 0..6 {
        let window = tone_window(330.0, 0.7, capture.window_size, capture.sample_rate);
        engine.process(&window)?;
    }

    let records: Vec<FeatureRecord> = engine.history().iter().cloned().collect();
    engine.enroll_voiceprint(&records)?;
    let accepted = engine.authenticate_voiceprint(&records)?;

    let mut impostor = records.clone();
    for record in &mut impostor {
        record.frequency += 1500.0;
    }
    let impostor_accepted = engine.authenticate_voiceprint(&impostor)?;

    tracing::info!(accepted, impostor_accepted, "voiceprint check");
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
#[command(author, version, about = "Signal resonance analysis engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a short synthetic capture session through the paced engine.
    Live {
        /// Base frequency of the synthetic tone in Hz.
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,
        /// Number of sample windows to analyse.
        #[arg(short, long, default_value_t = 20)]
        windows: u32,
        /// Optional path for the exported evolution log.
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Embed a message into synthetic feature records and read it back.
    Stego {
        /// Message to hide in the carrier sequence.
        message: String,
    },
    /// Enroll a synthetic voiceprint and test authentication against it.
    Voiceprint,
}
