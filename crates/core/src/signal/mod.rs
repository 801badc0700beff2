use std::f32::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::FeatureRecord;

/// Spectrum band a synthetic reading is drawn from. Non-audio bands use
/// band-local units (MHz for radio, MHz offsets for Wi-Fi) rather than
/// absolute Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalBand {
    Audio,
    Radio,
    Wifi,
    Synthetic,
}

/// One synthetic reading from a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub band: SignalBand,
    pub frequency: f32,
    pub amplitude: f32,
}

/// Generator standing in for non-microphone collaborators: it emits
/// band-plausible readings that can drive the same downstream consumers
/// as real analysis output.
#[derive(Debug)]
pub struct SignalSource {
    rng: StdRng,
}

impl SignalSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded variant for reproducible demo runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self, band: SignalBand) -> SignalRecord {
        let (frequency, amplitude) = match band {
            SignalBand::Radio => (
                self.rng.gen_range(88.5..108.5),
                self.rng.gen_range(0.2..0.5),
            ),
            SignalBand::Wifi => (
                self.rng.gen_range(2_400.0..2_500.0),
                self.rng.gen_range(0.1..0.3),
            ),
            SignalBand::Synthetic => (
                self.rng.gen_range(100.0..2_000.0),
                self.rng.gen_range(0.5..1.0),
            ),
            SignalBand::Audio => (
                self.rng.gen_range(20.0..20_000.0),
                self.rng.gen_range(0.1..0.2),
            ),
        };

        SignalRecord {
            band,
            frequency,
            amplitude,
        }
    }

    /// Lifts a reading into a synthetic feature record so non-audio bands
    /// can feed the classifier, codec, and voiceprint paths. The first two
    /// harmonic multiples stand in for measured harmonics.
    pub fn lift(&mut self, reading: &SignalRecord, timestamp: f64) -> FeatureRecord {
        FeatureRecord {
            frequency: reading.frequency,
            amplitude: reading.amplitude,
            harmonics: vec![reading.frequency * 2.0, reading.frequency * 3.0],
            phase: self.rng.gen_range(0.0..PI),
            coherence: self.rng.gen_range(0.0..1.0),
            timestamp,
        }
    }
}

impl Default for SignalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic sine window for demos and tests.
pub fn tone_window(frequency: f32, amplitude: f32, len: usize, sample_rate: u32) -> Vec<f32> {
    (0..len)
        .map(|n| amplitude * (2.0 * PI * frequency * n as f32 / sample_rate as f32).sin())
        .collect()
}
