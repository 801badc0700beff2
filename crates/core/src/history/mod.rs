use std::collections::VecDeque;

use crate::analysis::FeatureRecord;

/// Records kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;
/// Coherence judges stability over this many most-recent records.
const COHERENCE_SPAN: usize = 5;
/// Below this many records there is not enough history to judge stability.
const MIN_HISTORY: usize = 3;
/// Two harmonics within this distance count as the same partial.
const HARMONIC_TOLERANCE_HZ: f32 = 50.0;

/// Bounded FIFO of the most recent feature records. Owned by the engine,
/// mutated only by append-and-evict, and cleared only when the engine is
/// reconstructed.
#[derive(Debug, Default)]
pub struct FeatureHistory {
    records: VecDeque<FeatureRecord>,
}

impl FeatureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FeatureRecord) {
        self.records.push_back(record);
        if self.records.len() > HISTORY_CAPACITY {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&FeatureRecord> {
        self.records.back()
    }

    /// The last `count` records, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &FeatureRecord> {
        let skip = self.records.len().saturating_sub(count);
        self.records.iter().skip(skip)
    }
}

/// Composite stability score for a candidate record against recent history.
///
/// Returns 0.0 outright while history holds fewer than [`MIN_HISTORY`]
/// records. Otherwise averages three sub-scores over the last
/// [`COHERENCE_SPAN`] records: frequency stability `exp(-var/1000)`,
/// amplitude stability `exp(-var)`, and the mean harmonic-set similarity
/// against each record with non-empty harmonics. Always lands in [0, 1].
pub fn coherence(candidate: &FeatureRecord, history: &FeatureHistory) -> f32 {
    if history.len() < MIN_HISTORY {
        return 0.0;
    }

    let recent: Vec<&FeatureRecord> = history.recent(COHERENCE_SPAN).collect();

    let freq_variance = variance(recent.iter().map(|record| record.frequency));
    let freq_stability = (-freq_variance / 1000.0).exp();

    let amp_variance = variance(recent.iter().map(|record| record.amplitude));
    let amp_stability = (-amp_variance).exp();

    let harmonic_consistency = harmonic_consistency(&candidate.harmonics, &recent);

    (freq_stability + amp_stability + harmonic_consistency) / 3.0
}

fn variance(values: impl Iterator<Item = f32>) -> f32 {
    let values: Vec<f32> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f32>()
        / values.len() as f32
}

fn harmonic_consistency(current: &[f32], history: &[&FeatureRecord]) -> f32 {
    if current.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    let mut counted = 0usize;
    for record in history {
        if record.harmonics.is_empty() {
            continue;
        }
        total += harmonic_similarity(current, &record.harmonics);
        counted += 1;
    }

    if counted > 0 {
        total / counted as f32
    } else {
        0.0
    }
}

/// Fraction of harmonics with a tolerance match in the other set, relative
/// to the larger set. Symmetric tolerance match, not multiset-exact.
fn harmonic_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut matches = 0usize;
    for harmonic in a {
        if b.iter().any(|other| (harmonic - other).abs() < HARMONIC_TOLERANCE_HZ) {
            matches += 1;
        }
    }
    matches as f32 / a.len().max(b.len()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(frequency: f32, amplitude: f32, harmonics: Vec<f32>) -> FeatureRecord {
        FeatureRecord {
            frequency,
            amplitude,
            harmonics,
            phase: 0.5,
            coherence: 0.0,
            timestamp: 0.0,
        }
    }

    #[test]
    fn coherence_is_zero_until_three_records_exist() {
        let mut history = FeatureHistory::new();
        let candidate = record(440.0, 0.5, vec![880.0]);

        assert_eq!(coherence(&candidate, &history), 0.0);
        history.push(record(440.0, 0.5, vec![880.0]));
        history.push(record(441.0, 0.5, vec![880.0]));
        assert_eq!(coherence(&candidate, &history), 0.0);

        history.push(record(442.0, 0.5, vec![880.0]));
        assert!(coherence(&candidate, &history) > 0.0);
    }

    #[test]
    fn stable_history_scores_high_and_stays_in_range() {
        let mut history = FeatureHistory::new();
        for _ in 0..5 {
            history.push(record(440.0, 0.5, vec![880.0, 1320.0]));
        }

        let candidate = record(440.0, 0.5, vec![880.0, 1320.0]);
        let score = coherence(&candidate, &history);
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.9);
    }

    #[test]
    fn jittery_frequencies_lower_the_score() {
        let mut stable = FeatureHistory::new();
        let mut jittery = FeatureHistory::new();
        for step in 0..5 {
            stable.push(record(440.0, 0.5, vec![880.0]));
            jittery.push(record(200.0 + step as f32 * 150.0, 0.5, vec![880.0]));
        }

        let candidate = record(440.0, 0.5, vec![880.0]);
        assert!(coherence(&candidate, &stable) > coherence(&candidate, &jittery));
    }

    #[test]
    fn harmonic_match_uses_the_tolerance_window() {
        let mut history = FeatureHistory::new();
        for _ in 0..5 {
            history.push(record(440.0, 0.5, vec![880.0]));
        }

        // 40 Hz off still matches; 80 Hz off does not.
        let near = record(440.0, 0.5, vec![920.0]);
        let far = record(440.0, 0.5, vec![960.0]);
        assert!(coherence(&near, &history) > coherence(&far, &history));
    }

    #[test]
    fn history_evicts_oldest_beyond_capacity() {
        let mut history = FeatureHistory::new();
        for step in 0..15 {
            history.push(record(step as f32, 0.5, Vec::new()));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        let oldest = history.iter().next().unwrap().frequency;
        assert_eq!(oldest, 5.0);
        assert_eq!(history.latest().unwrap().frequency, 14.0);
    }
}
