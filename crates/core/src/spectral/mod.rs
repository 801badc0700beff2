use std::{
    collections::VecDeque,
    f32::consts::PI,
    hash::{Hash, Hasher},
};

use crate::config::SpectralConfig;

/// Spectra are cached per engine; lookups are linear over this many entries.
const CACHE_CAPACITY: usize = 5;
/// Every Nth sample participates in the cache key.
const CACHE_KEY_STRIDE: usize = 10;
/// Inner-loop decimation: every Nth time-domain sample enters the summation.
const SAMPLE_STRIDE: usize = 2;
/// Every other bin is computed; the neighbour is duplicated from it.
const BIN_STRIDE: usize = 2;
/// Harmonics below this fraction of the fundamental magnitude are dropped.
const HARMONIC_FLOOR_RATIO: f32 = 0.1;
/// Highest harmonic multiple considered, inclusive.
const MAX_HARMONIC: usize = 6;
/// Scales spectrum RMS so typical amplitudes land in 0..~1.
const AMPLITUDE_NORM: f32 = 1000.0;
/// Peaks at or below this magnitude count as "no signal".
const MIN_PEAK_MAGNITUDE: f32 = 1e-3;

/// Magnitude estimator over fixed-size sample windows.
///
/// The transform is a direct per-bin summation, not an FFT. Cost is bounded
/// by striding over the input and by computing every other bin, duplicating
/// it into the neighbour. That halves the usable Nyquist range and smears
/// adjacent bins. This is an intentional precision/performance trade-off;
/// the downstream classifier thresholds are tuned against its output, so do
/// not swap in a true FFT without re-deriving them.
pub struct SpectralAnalyzer {
    sample_rate: u32,
    config: SpectralConfig,
    cache: VecDeque<(u64, Vec<f32>)>,
}

impl SpectralAnalyzer {
    pub fn new(sample_rate: u32, config: SpectralConfig) -> Self {
        Self {
            sample_rate,
            config,
            cache: VecDeque::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Computes the magnitude spectrum for one window. The window is read
    /// but never retained; results are memoised under a coarse key so the
    /// same buffer analysed twice in a row costs one summation.
    pub fn magnitude_spectrum(&mut self, window: &[f32]) -> Vec<f32> {
        let key = cache_key(window);
        if let Some((_, spectrum)) = self.cache.iter().find(|(k, _)| *k == key) {
            return spectrum.clone();
        }

        let spectrum = compute_spectrum(window);

        self.cache.push_back((key, spectrum.clone()));
        if self.cache.len() > CACHE_CAPACITY {
            self.cache.pop_front();
        }

        spectrum
    }

    /// Returns the frequency of the strongest bin inside the configured scan
    /// band, or the fallback frequency when nothing clears the floor.
    pub fn dominant_frequency(&self, spectrum: &[f32]) -> f32 {
        if spectrum.is_empty() {
            return self.config.fallback_frequency_hz;
        }

        let hz_per_bin = self.hz_per_bin(spectrum.len());
        let low_bin = ((self.config.scan_low_hz / hz_per_bin).ceil() as usize).max(1);
        let high_bin =
            ((self.config.scan_high_hz / hz_per_bin).floor() as usize).min(spectrum.len() - 1);

        let mut peak_bin = 0;
        let mut peak_magnitude = 0.0_f32;
        for bin in low_bin..=high_bin {
            if spectrum[bin] > peak_magnitude {
                peak_magnitude = spectrum[bin];
                peak_bin = bin;
            }
        }

        if peak_magnitude <= MIN_PEAK_MAGNITUDE {
            return self.config.fallback_frequency_hz;
        }

        peak_bin as f32 * hz_per_bin
    }

    /// Harmonic multiples 2..=6 of the fundamental whose magnitude clears
    /// 10% of the fundamental's, ordered by harmonic order.
    pub fn harmonics(&self, spectrum: &[f32], fundamental_hz: f32) -> Vec<f32> {
        if spectrum.is_empty() {
            return Vec::new();
        }

        let hz_per_bin = self.hz_per_bin(spectrum.len());
        let fundamental_bin = (fundamental_hz / hz_per_bin).round() as usize;
        if fundamental_bin == 0 || fundamental_bin >= spectrum.len() {
            return Vec::new();
        }

        let floor = spectrum[fundamental_bin] * HARMONIC_FLOOR_RATIO;
        let mut harmonics = Vec::new();
        for order in 2..=MAX_HARMONIC {
            let bin = fundamental_bin * order;
            if bin >= spectrum.len() {
                break;
            }
            if spectrum[bin] > floor {
                harmonics.push(bin as f32 * hz_per_bin);
            }
        }

        harmonics
    }

    fn hz_per_bin(&self, bins: usize) -> f32 {
        self.sample_rate as f32 / (bins as f32 * 2.0)
    }

    #[cfg(test)]
    pub(crate) fn cached_spectra(&self) -> usize {
        self.cache.len()
    }
}

fn compute_spectrum(window: &[f32]) -> Vec<f32> {
    let n = window.len();
    let bins = n / 2;
    let mut spectrum = vec![0.0_f32; bins];

    let mut k = 0;
    while k < bins {
        let mut re = 0.0_f32;
        let mut im = 0.0_f32;
        let mut i = 0;
        while i < n {
            let angle = -2.0 * PI * k as f32 * i as f32 / n as f32;
            re += window[i] * angle.cos();
            im += window[i] * angle.sin();
            i += SAMPLE_STRIDE;
        }
        // Stride compensation keeps magnitudes on the full-summation scale
        // that AMPLITUDE_NORM and the peak floor were tuned against.
        let magnitude = (re * re + im * im).sqrt() * SAMPLE_STRIDE as f32;
        spectrum[k] = magnitude;
        if k + 1 < bins {
            spectrum[k + 1] = magnitude;
        }
        k += BIN_STRIDE;
    }

    spectrum
}

/// RMS of the magnitude spectrum, normalised into roughly 0..1.
pub fn amplitude(spectrum: &[f32]) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let sum: f32 = spectrum.iter().map(|magnitude| magnitude * magnitude).sum();
    (sum / spectrum.len() as f32).sqrt() / AMPLITUDE_NORM
}

/// Zero-crossing rate of the raw window scaled to radians. A cheap phase
/// proxy, not a phase spectrum.
pub fn phase(window: &[f32]) -> f32 {
    if window.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0usize;
    for pair in window.windows(2) {
        if (pair[0] >= 0.0) != (pair[1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / window.len() as f32 * PI
}

/// RMS of the raw time-domain window.
pub fn window_rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f32 = window.iter().map(|sample| sample * sample).sum();
    (sum / window.len() as f32).sqrt()
}

fn cache_key(window: &[f32]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    window.len().hash(&mut hasher);
    for sample in window.iter().step_by(CACHE_KEY_STRIDE) {
        ((sample * 1000.0) as i64).hash(&mut hasher);
    }
    hasher.finish()
}
