//! Distance-threshold speaker matching over flattened feature vectors.
//! A lightweight heuristic, not biometric-grade verification.

use serde::{Deserialize, Serialize};

use crate::{analysis::FeatureRecord, ResonanceError, Result};

/// Minimum records for both enrollment and authentication.
pub const MIN_RECORDS: usize = 5;
/// Euclidean distance below this matches. Unitless, tied to the
/// unnormalised feature scales (frequency dominates).
pub const MATCH_THRESHOLD: f32 = 1000.0;

/// Stored reference feature vector: `(frequency, amplitude, coherence)`
/// per record, flattened in order. Overwritten by re-enrollment, never
/// mutated by authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voiceprint {
    features: Vec<f32>,
}

impl Voiceprint {
    /// Builds a voiceprint from at least [`MIN_RECORDS`] records.
    pub fn enroll(records: &[FeatureRecord]) -> Result<Self> {
        if records.len() < MIN_RECORDS {
            return Err(ResonanceError::InsufficientData(
                "voiceprint enrollment needs at least 5 feature records",
            ));
        }
        Ok(Self {
            features: flatten(records),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Compares candidate records against the stored vector. Too few
    /// records is an error; a differently-shaped candidate is a
    /// [`ResonanceError::DimensionMismatch`] rather than the out-of-range
    /// access a naive comparison would risk. A failed match is `Ok(false)`.
    pub fn authenticate(&self, records: &[FeatureRecord]) -> Result<bool> {
        if records.len() < MIN_RECORDS {
            return Err(ResonanceError::InsufficientData(
                "voiceprint authentication needs at least 5 feature records",
            ));
        }

        let candidate = flatten(records);
        if candidate.len() != self.features.len() {
            return Err(ResonanceError::DimensionMismatch {
                candidate: candidate.len(),
                enrolled: self.features.len(),
            });
        }

        let distance = euclidean_distance(&self.features, &candidate);
        Ok(distance < MATCH_THRESHOLD)
    }
}

fn flatten(records: &[FeatureRecord]) -> Vec<f32> {
    records
        .iter()
        .flat_map(|record| [record.frequency, record.amplitude, record.coherence])
        .collect()
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}
