use serde::{Deserialize, Serialize};

/// Engine settings shared by the CLI and the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Champion list size per term; 0 disables champion lists.
    pub champion_capacity: usize,
    /// Result count when a caller does not ask for one.
    pub default_k: usize,
    /// Upper bound the outer surfaces clamp `k` to.
    pub max_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { champion_capacity: 0, default_k: 10, max_k: 100 }
    }
}

impl EngineConfig {
    pub fn with_champion_capacity(mut self, champion_capacity: usize) -> Self {
        self.champion_capacity = champion_capacity;
        self
    }

    /// `requested` or the default, never above `max_k`.
    pub fn clamp_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_k).min(self.max_k)
    }
}
