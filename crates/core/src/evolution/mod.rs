use serde::{Deserialize, Serialize};

use crate::{analysis::FeatureRecord, history::FeatureHistory, ResonanceError, Result};

/// Entries kept before the oldest are dropped.
pub const LOG_CAPACITY: usize = 256;
/// Records whose coherence feeds the phase decision.
const PHASE_SPAN: usize = 3;

/// Coarse description of how settled the session currently is, derived
/// from the mean coherence of the most recent records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemPhase {
    Void,
    Emergence,
    Coherence,
    PhaseLock,
}

impl SystemPhase {
    pub fn from_history(history: &FeatureHistory) -> Self {
        if history.len() < PHASE_SPAN {
            return SystemPhase::Void;
        }

        let mean = history
            .recent(PHASE_SPAN)
            .map(|record| record.coherence)
            .sum::<f32>()
            / PHASE_SPAN as f32;

        if mean > 0.8 {
            SystemPhase::PhaseLock
        } else if mean > 0.6 {
            SystemPhase::Coherence
        } else if mean > 0.3 {
            SystemPhase::Emergence
        } else {
            SystemPhase::Void
        }
    }
}

/// One line of the session's evolution trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEntry {
    pub timestamp: f64,
    pub phase: SystemPhase,
    pub frequency: f32,
    pub coherence: f32,
}

/// Count of entries per phase, for at-a-glance summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDistribution {
    pub void: usize,
    pub emergence: usize,
    pub coherence: usize,
    pub phase_lock: usize,
}

/// Bounded trail of per-window phase observations. The core only records;
/// persisting or displaying the trail is a collaborator concern, so the
/// log serialises itself and does no IO.
#[derive(Debug, Default)]
pub struct EvolutionLog {
    entries: Vec<EvolutionEntry>,
}

impl EvolutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &FeatureRecord, phase: SystemPhase) {
        self.entries.push(EvolutionEntry {
            timestamp: record.timestamp,
            phase,
            frequency: record.frequency,
            coherence: record.coherence,
        });
        if self.entries.len() > LOG_CAPACITY {
            let overflow = self.entries.len() - LOG_CAPACITY;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[EvolutionEntry] {
        &self.entries
    }

    pub fn phase_distribution(&self) -> PhaseDistribution {
        let mut distribution = PhaseDistribution::default();
        for entry in &self.entries {
            match entry.phase {
                SystemPhase::Void => distribution.void += 1,
                SystemPhase::Emergence => distribution.emergence += 1,
                SystemPhase::Coherence => distribution.coherence += 1,
                SystemPhase::PhaseLock => distribution.phase_lock += 1,
            }
        }
        distribution
    }

    /// Renders the trail as pretty-printed JSON for export by collaborators.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|err| ResonanceError::msg(format!("evolution log serialisation failed: {err}")))
    }
}
