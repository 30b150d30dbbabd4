//! Engine configuration.

use super::LogicEngine;

/// Settings of a [`LogicEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run only dirty nodes on `update()`. When disabled, every node runs on
    /// every update.
    pub dirty_tracking: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dirty_tracking: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dirty_tracking(mut self, enabled: bool) -> Self {
        self.config.dirty_tracking = enabled;
        self
    }

    pub fn build(self) -> LogicEngine {
        LogicEngine::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_tracking_is_on_by_default() {
        assert!(EngineConfig::default().dirty_tracking);
        assert!(LogicEngine::new().config().dirty_tracking);
    }

    #[test]
    fn builder_overrides_defaults() {
        let engine = LogicEngine::builder().dirty_tracking(false).build();
        assert!(!engine.config().dirty_tracking);
    }
}
