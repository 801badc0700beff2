//! Core library for the Resonance Engine application.
//!
//! The crate turns short windows of a real-valued signal into a compact
//! feature record (dominant frequency, harmonics, amplitude, phase and a
//! temporal coherence score) and offers three consumers of those records:
//! a cognitive-state classifier, a low-order-bit steganography codec, and
//! a distance-threshold voiceprint check. Each module owns one subsystem;
//! signal capture, rendering and persistence live with collaborators.

pub mod analysis;
pub mod cognition;
pub mod config;
pub mod engine;
pub mod error;
pub mod evolution;
pub mod history;
pub mod signal;
pub mod spectral;
pub mod stego;
pub mod voiceprint;

pub use analysis::{FeatureRecord, ResonanceEngine};
pub use cognition::{classify, CognitiveState, EmotionalState, MentalState, Sentiment, SentimentLabel};
pub use config::{CaptureConfig, EngineConfig, SpectralConfig};
pub use engine::{SessionEngine, SessionHandle};
pub use error::{ResonanceError, Result};
pub use evolution::{EvolutionEntry, EvolutionLog, PhaseDistribution, SystemPhase};
pub use history::{coherence, FeatureHistory};
pub use signal::{tone_window, SignalBand, SignalRecord, SignalSource};
pub use spectral::SpectralAnalyzer;
pub use stego::{embed, extract};
pub use voiceprint::Voiceprint;
