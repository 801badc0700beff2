use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    analysis::{FeatureRecord, ResonanceEngine},
    cognition::CognitiveState,
    config::EngineConfig,
    evolution::SystemPhase,
    ResonanceError, Result,
};

/// High level session facade.
///
/// The core engine has no internal locking; this facade is the supported
/// way to share one capture session across threads, serialising access
/// through a single mutex. One facade per capture session.
#[derive(Debug)]
pub struct SessionEngine {
    config: EngineConfig,
    engine: Arc<Mutex<ResonanceEngine>>,
}

impl SessionEngine {
    /// Creates a new session using the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let engine = ResonanceEngine::with_config(config.clone());
        Self {
            config,
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begins a fresh session and returns a handle to the shared engine.
    /// Accumulated state only ever resets through this reconstruction.
    pub fn start(&self) -> Result<SessionHandle> {
        {
            let mut engine = self.lock_engine()?;
            *engine = ResonanceEngine::with_config(self.config.clone());
        }

        Ok(SessionHandle::new(self.engine.clone()))
    }

    /// Feeds one sample window into the engine. Capture loops call this
    /// repeatedly; offline pipelines can use it to replay decoded windows.
    pub fn push_window(&self, samples: &[f32]) -> Result<FeatureRecord> {
        let mut engine = self.lock_engine()?;
        engine.process(samples)
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, ResonanceEngine>> {
        self.engine
            .lock()
            .map_err(|_| ResonanceError::msg("analysis engine has been poisoned"))
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, thread-safe view over the engine managed by [`SessionEngine`].
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Mutex<ResonanceEngine>>,
}

impl SessionHandle {
    pub(crate) fn new(shared: Arc<Mutex<ResonanceEngine>>) -> Self {
        Self { shared }
    }

    /// The most recent feature record, if any window has been processed.
    pub fn latest(&self) -> Result<Option<FeatureRecord>> {
        let engine = self.lock()?;
        Ok(engine.latest().cloned())
    }

    /// Current system phase derived from recent coherence.
    pub fn phase(&self) -> Result<SystemPhase> {
        let engine = self.lock()?;
        Ok(engine.phase())
    }

    /// Classifies the most recent record against accumulated history.
    pub fn classify_latest(&self) -> Result<Option<CognitiveState>> {
        let engine = self.lock()?;
        Ok(engine.classify_latest())
    }

    /// The evolution trail as pretty-printed JSON, ready for export.
    pub fn evolution_json(&self) -> Result<String> {
        let engine = self.lock()?;
        engine.evolution().to_json()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ResonanceEngine>> {
        self.shared
            .lock()
            .map_err(|_| ResonanceError::msg("analysis engine has been poisoned"))
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::tone_window;

    #[test]
    fn pushes_windows_into_the_shared_engine() {
        let session = SessionEngine::with_config(EngineConfig::offline());
        let handle = session.start().unwrap();

        let window = tone_window(440.0, 0.8, 1024, 44_100);
        session
            .push_window(&window)
            .expect("pushing a window should succeed");

        let latest = handle.latest().unwrap();
        assert!(latest.is_some());
        assert!(latest.unwrap().amplitude > 0.0);
    }

    #[test]
    fn starting_again_reconstructs_the_engine() {
        let session = SessionEngine::with_config(EngineConfig::offline());
        let _ = session.start().unwrap();

        let window = tone_window(440.0, 0.8, 1024, 44_100);
        session.push_window(&window).unwrap();

        let handle = session.start().unwrap();
        assert!(handle.latest().unwrap().is_none());
        assert_eq!(handle.phase().unwrap(), SystemPhase::Void);
    }
}
