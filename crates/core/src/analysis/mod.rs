use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{
    cognition::{self, CognitiveState},
    config::EngineConfig,
    evolution::{EvolutionLog, SystemPhase},
    history::{self, FeatureHistory},
    spectral::{self, SpectralAnalyzer},
    voiceprint::Voiceprint,
    ResonanceError, Result,
};

/// Near-silent windows still report this fraction of the raw RMS as
/// amplitude so downstream consumers never see a dead signal.
const AMPLITUDE_FLOOR_RATIO: f32 = 0.1;

/// Durable output of one analysis cycle. Immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Dominant frequency in Hz, always plausible, never zero.
    pub frequency: f32,
    /// Normalised spectrum RMS, floored against the raw-signal RMS.
    pub amplitude: f32,
    /// Up to five harmonic frequencies, ordered by harmonic order. Entries
    /// below 10% of the fundamental magnitude are excluded.
    pub harmonics: Vec<f32>,
    /// Zero-crossing phase proxy in radians, 0..π.
    pub phase: f32,
    /// Stability score over recent history, 0..1.
    pub coherence: f32,
    /// Monotonic seconds since engine construction.
    pub timestamp: f64,
}

/// Synchronous, single-threaded analysis engine. One instance owns all
/// mutable state (history, spectrum cache, voiceprint, evolution log) for
/// one capture session; concurrent callers must serialize externally.
pub struct ResonanceEngine {
    config: EngineConfig,
    started: Instant,
    spectral: SpectralAnalyzer,
    history: FeatureHistory,
    evolution: EvolutionLog,
    voiceprint: Option<Voiceprint>,
    last_processed: Option<Instant>,
    last_record: Option<FeatureRecord>,
}

impl ResonanceEngine {
    /// Creates a new engine using the default 44.1 kHz configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let spectral = SpectralAnalyzer::new(config.capture.sample_rate, config.spectral.clone());
        Self {
            config,
            started: Instant::now(),
            spectral,
            history: FeatureHistory::new(),
            evolution: EvolutionLog::new(),
            voiceprint: None,
            last_processed: None,
            last_record: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.spectral.sample_rate()
    }

    /// Extracts the feature record for one sample window.
    ///
    /// Calls arriving sooner than the configured minimum interval after the
    /// previous computation return a clone of the cached record unchanged.
    /// That short-circuit is a deliberate rate limit on the pull-based
    /// pipeline, not a staleness bug; the check is a plain wall-clock
    /// comparison, independent of any host scheduling primitive.
    pub fn process(&mut self, window: &[f32]) -> Result<FeatureRecord> {
        if window.is_empty() {
            return Err(ResonanceError::InvalidInput(
                "analysis requires at least one sample",
            ));
        }

        let now = Instant::now();
        let min_interval = Duration::from_millis(self.config.capture.min_process_interval_ms);
        if let (Some(last), Some(record)) = (self.last_processed, self.last_record.as_ref()) {
            if now.duration_since(last) < min_interval {
                return Ok(record.clone());
            }
        }

        let limit = window.len().min(self.config.capture.window_size);
        let window = &window[..limit];

        let spectrum = self.spectral.magnitude_spectrum(window);
        let frequency = self.spectral.dominant_frequency(&spectrum);
        let harmonics = self.spectral.harmonics(&spectrum, frequency);
        let raw_rms = spectral::window_rms(window);
        let amplitude = spectral::amplitude(&spectrum).max(raw_rms * AMPLITUDE_FLOOR_RATIO);
        let phase = spectral::phase(window);
        let timestamp = now.duration_since(self.started).as_secs_f64();

        let mut record = FeatureRecord {
            frequency,
            amplitude,
            harmonics,
            phase,
            coherence: 0.0,
            timestamp,
        };
        record.coherence = history::coherence(&record, &self.history);

        self.history.push(record.clone());
        self.evolution
            .observe(&record, SystemPhase::from_history(&self.history));
        self.last_processed = Some(now);
        self.last_record = Some(record.clone());

        Ok(record)
    }

    /// Returns the most recent record without triggering any computation.
    pub fn latest(&self) -> Option<&FeatureRecord> {
        self.last_record.as_ref()
    }

    pub fn history(&self) -> &FeatureHistory {
        &self.history
    }

    /// Current system phase derived from recent coherence.
    pub fn phase(&self) -> SystemPhase {
        SystemPhase::from_history(&self.history)
    }

    pub fn evolution(&self) -> &EvolutionLog {
        &self.evolution
    }

    /// Classifies the most recent record against the accumulated history.
    pub fn classify_latest(&self) -> Option<CognitiveState> {
        self.last_record
            .as_ref()
            .map(|record| cognition::classify(record, &self.history))
    }

    /// Stores a reference voiceprint built from the given records,
    /// overwriting any prior enrollment. Fewer than five records leave the
    /// existing voiceprint untouched.
    pub fn enroll_voiceprint(&mut self, records: &[FeatureRecord]) -> Result<()> {
        let voiceprint = Voiceprint::enroll(records)?;
        self.voiceprint = Some(voiceprint);
        Ok(())
    }

    pub fn is_enrolled(&self) -> bool {
        self.voiceprint.is_some()
    }

    /// Compares candidate records against the enrolled voiceprint. A failed
    /// match is `Ok(false)`; missing enrollment or too few records is an
    /// error, distinct from rejection.
    pub fn authenticate_voiceprint(&self, records: &[FeatureRecord]) -> Result<bool> {
        match self.voiceprint.as_ref() {
            Some(voiceprint) => voiceprint.authenticate(records),
            None => Err(ResonanceError::InsufficientData(
                "no voiceprint has been enrolled",
            )),
        }
    }
}

impl Default for ResonanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResonanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResonanceEngine")
            .field("sample_rate", &self.sample_rate())
            .field("history", &self.history.len())
            .field("enrolled", &self.voiceprint.is_some())
            .field("last_record", &self.last_record.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::tone_window;

    fn offline_engine() -> ResonanceEngine {
        ResonanceEngine::with_config(EngineConfig::offline())
    }

    fn window(frequency: f32) -> Vec<f32> {
        tone_window(frequency, 0.8, 1024, 44_100)
    }

    #[test]
    fn rejects_empty_windows() {
        let mut engine = ResonanceEngine::new();
        let err = engine.process(&[]).unwrap_err();
        assert!(matches!(err, ResonanceError::InvalidInput(_)));
    }

    #[test]
    fn throttled_calls_return_the_identical_record() {
        let mut engine = ResonanceEngine::new();

        let first = engine.process(&window(440.0)).unwrap();
        // Well inside the 50 ms floor, even against a very different window.
        let second = engine.process(&window(1200.0)).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn offline_engine_recomputes_every_window() {
        let mut engine = offline_engine();
        engine.process(&window(440.0)).unwrap();
        engine.process(&window(440.0)).unwrap();
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn near_silence_still_yields_signal() {
        let mut engine = offline_engine();
        let faint: Vec<f32> = (0..1024).map(|n| if n % 2 == 0 { 1e-4 } else { -1e-4 }).collect();
        let record = engine.process(&faint).unwrap();

        assert!(record.amplitude > 0.0);
        assert!(record.frequency > 0.0);
    }

    #[test]
    fn coherence_stays_in_range_and_rises_with_stability() {
        let mut engine = offline_engine();
        let mut last = FeatureRecord::default();
        for _ in 0..6 {
            last = engine.process(&window(440.0)).unwrap();
            assert!((0.0..=1.0).contains(&last.coherence));
            assert!(last.amplitude >= 0.0);
        }
        // Identical windows make frequency and amplitude variance vanish.
        assert!(last.coherence > 0.5);
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut engine = offline_engine();
        let first = engine.process(&window(440.0)).unwrap();
        let second = engine.process(&window(440.0)).unwrap();
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn steady_tone_settles_out_of_the_void_phase() {
        let mut engine = offline_engine();
        assert_eq!(engine.phase(), SystemPhase::Void);
        for _ in 0..8 {
            engine.process(&window(440.0)).unwrap();
        }
        assert_ne!(engine.phase(), SystemPhase::Void);
        assert_eq!(engine.evolution().entries().len(), 8);
    }
}
