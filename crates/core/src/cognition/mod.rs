use serde::{Deserialize, Serialize};

use crate::{analysis::FeatureRecord, history::FeatureHistory};

/// Breathing-band ceiling in Hz.
const BREATHING_MAX_HZ: f32 = 150.0;
/// Voiced-signal band in Hz.
const VOICE_BAND_HZ: (f32, f32) = (250.0, 3000.0);
/// Historical frequencies considered for pitch variation.
const PITCH_SPAN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionalState {
    Calm,
    Agitated,
    Focused,
    Distracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MentalState {
    Receptive,
    Resistant,
    Suggestible,
    Analytical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: f32,
    pub label: SentimentLabel,
}

/// Inferred internal state derived from one record plus recent history.
/// Recomputed fresh on every call and never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveState {
    pub emotional: EmotionalState,
    pub mental: MentalState,
    pub sentiment: Sentiment,
}

/// Maps a feature record to an emotional/mental state pair and a sentiment
/// score. Pure function of its inputs; first matching rule wins per axis.
pub fn classify(record: &FeatureRecord, history: &FeatureHistory) -> CognitiveState {
    let is_breathing = record.frequency < BREATHING_MAX_HZ && record.coherence > 0.6;
    let is_voice = record.frequency > VOICE_BAND_HZ.0
        && record.frequency < VOICE_BAND_HZ.1
        && record.harmonics.len() > 2;

    CognitiveState {
        emotional: classify_emotional(record, history, is_breathing, is_voice),
        mental: classify_mental(record, is_breathing),
        sentiment: score_sentiment(record),
    }
}

fn classify_emotional(
    record: &FeatureRecord,
    history: &FeatureHistory,
    is_breathing: bool,
    is_voice: bool,
) -> EmotionalState {
    if is_breathing {
        // Treat the dominant frequency as a breaths-per-minute proxy.
        let breathing_rate = record.frequency / 60.0;
        if breathing_rate > 20.0 || record.amplitude > 0.6 {
            EmotionalState::Agitated
        } else if record.coherence > 0.8 {
            EmotionalState::Calm
        } else {
            EmotionalState::Distracted
        }
    } else if is_voice {
        if pitch_variation(history) > 0.5 && record.amplitude > 0.6 {
            EmotionalState::Agitated
        } else if record.coherence > 0.7 {
            EmotionalState::Focused
        } else {
            EmotionalState::Distracted
        }
    } else if record.amplitude > 0.5 {
        if record.coherence > 0.7 {
            EmotionalState::Focused
        } else {
            EmotionalState::Agitated
        }
    } else if record.coherence < 0.3 {
        EmotionalState::Distracted
    } else {
        EmotionalState::Calm
    }
}

fn classify_mental(record: &FeatureRecord, is_breathing: bool) -> MentalState {
    let complexity = record.harmonics.len() as f32 * record.coherence;
    if complexity > 4.0 {
        MentalState::Analytical
    } else if record.coherence < 0.2 {
        MentalState::Resistant
    } else if is_breathing && record.coherence > 0.8 {
        MentalState::Receptive
    } else if record.frequency > 1000.0 {
        MentalState::Analytical
    } else {
        MentalState::Suggestible
    }
}

/// Coefficient of variation of the last few recorded frequencies.
fn pitch_variation(history: &FeatureHistory) -> f32 {
    let frequencies: Vec<f32> = history
        .recent(PITCH_SPAN)
        .map(|record| record.frequency)
        .collect();
    if frequencies.len() < 2 {
        return 0.0;
    }

    let mean = frequencies.iter().sum::<f32>() / frequencies.len() as f32;
    if mean <= f32::EPSILON {
        return 0.0;
    }
    let variance = frequencies
        .iter()
        .map(|frequency| (frequency - mean).powi(2))
        .sum::<f32>()
        / frequencies.len() as f32;

    variance.sqrt() / mean
}

/// Scores a synthetic descriptor token built from the rounded feature
/// values with a small word-polarity lexicon. Deterministic for a given
/// record.
fn score_sentiment(record: &FeatureRecord) -> Sentiment {
    let token = synthetic_token(record);
    let score: f32 = token.split_whitespace().map(word_polarity).sum();
    let label = if score > 0.0 {
        SentimentLabel::Positive
    } else if score < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    Sentiment { score, label }
}

fn synthetic_token(record: &FeatureRecord) -> String {
    let frequency = record.frequency.round();
    let amplitude = (record.amplitude * 10.0).round();
    let coherence = (record.coherence * 10.0).round();

    let register = if frequency >= 1000.0 {
        "bright"
    } else if frequency >= 250.0 {
        "warm"
    } else {
        "deep"
    };
    let level = if amplitude > 6.0 {
        "loud"
    } else if amplitude > 2.0 {
        "steady"
    } else {
        "quiet"
    };
    let texture = if coherence > 7.0 {
        "clear"
    } else if coherence > 3.0 {
        "drifting"
    } else {
        "chaotic"
    };

    format!("{register} {level} {texture}")
}

fn word_polarity(word: &str) -> f32 {
    match word {
        "bright" | "warm" | "steady" | "clear" => 1.0,
        "loud" | "chaotic" | "harsh" => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(frequency: f32, amplitude: f32, coherence: f32, harmonics: Vec<f32>) -> FeatureRecord {
        FeatureRecord {
            frequency,
            amplitude,
            harmonics,
            phase: 0.5,
            coherence,
            timestamp: 0.0,
        }
    }

    fn steady_history(frequency: f32) -> FeatureHistory {
        let mut history = FeatureHistory::new();
        for _ in 0..5 {
            history.push(record(frequency, 0.4, 0.8, vec![frequency * 2.0]));
        }
        history
    }

    #[test]
    fn slow_coherent_breathing_reads_calm_and_receptive() {
        let history = steady_history(100.0);
        let candidate = record(100.0, 0.3, 0.9, Vec::new());

        let state = classify(&candidate, &history);
        assert_eq!(state.emotional, EmotionalState::Calm);
        assert_eq!(state.mental, MentalState::Receptive);
    }

    #[test]
    fn steady_voice_reads_focused() {
        let history = steady_history(440.0);
        let candidate = record(440.0, 0.4, 0.8, vec![880.0, 1320.0, 1760.0]);

        let state = classify(&candidate, &history);
        assert_eq!(state.emotional, EmotionalState::Focused);
        assert_eq!(state.mental, MentalState::Suggestible);
    }

    #[test]
    fn wild_pitch_and_volume_read_agitated() {
        let mut history = FeatureHistory::new();
        for step in 0..5 {
            history.push(record(300.0 + step as f32 * 400.0, 0.7, 0.4, vec![880.0]));
        }
        let candidate = record(900.0, 0.8, 0.5, vec![1800.0, 2700.0, 3600.0, 4500.0]);

        let state = classify(&candidate, &history);
        assert_eq!(state.emotional, EmotionalState::Agitated);
    }

    #[test]
    fn rich_coherent_harmonics_read_analytical() {
        let history = steady_history(440.0);
        let candidate = record(
            440.0,
            0.4,
            0.9,
            vec![880.0, 1320.0, 1760.0, 2200.0, 2640.0],
        );

        let state = classify(&candidate, &history);
        assert_eq!(state.mental, MentalState::Analytical);
    }

    #[test]
    fn incoherent_signal_reads_resistant_and_distracted() {
        let history = FeatureHistory::new();
        let candidate = record(500.0, 0.2, 0.1, Vec::new());

        let state = classify(&candidate, &history);
        assert_eq!(state.emotional, EmotionalState::Distracted);
        assert_eq!(state.mental, MentalState::Resistant);
    }

    #[test]
    fn sentiment_is_deterministic_and_labelled_by_sign() {
        let history = FeatureHistory::new();
        let candidate = record(440.0, 0.4, 0.9, Vec::new());

        let first = classify(&candidate, &history);
        let second = classify(&candidate, &history);
        assert_eq!(first.sentiment, second.sentiment);

        // warm + steady + clear are all positive words.
        assert_eq!(first.sentiment.label, SentimentLabel::Positive);
        assert!(first.sentiment.score > 0.0);

        let noisy = record(100.0, 0.9, 0.1, Vec::new());
        let state = classify(&noisy, &history);
        assert_eq!(state.sentiment.label, SentimentLabel::Negative);
    }
}
