use serde::{Deserialize, Serialize};

/// Top-level configuration for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub capture: CaptureConfig,
    pub spectral: SpectralConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            spectral: SpectralConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration for offline pipelines that replay pre-recorded windows
    /// as fast as possible instead of pacing against wall-clock time.
    pub fn offline() -> Self {
        Self {
            capture: CaptureConfig {
                min_process_interval_ms: 0,
                ..CaptureConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Configuration of the sample windows the engine consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub window_size: usize,
    /// Calls arriving sooner than this after the previous computation get
    /// the cached record back instead of a fresh analysis.
    pub min_process_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            window_size: 1024,
            min_process_interval_ms: 50,
        }
    }
}

/// Configuration of the dominant-frequency search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Lower edge of the scanned band, in Hz.
    pub scan_low_hz: f32,
    /// Upper edge of the scanned band, in Hz.
    pub scan_high_hz: f32,
    /// Reported when no bin in the band clears the magnitude floor. The
    /// engine always reports a plausible frequency, never zero.
    pub fallback_frequency_hz: f32,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            scan_low_hz: 50.0,
            scan_high_hz: 4_000.0,
            fallback_frequency_hz: 440.0,
        }
    }
}
