//! Registry configuration

/// Configuration for the room registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Per-subscriber sink capacity, in frames
    ///
    /// There is no backpressure: a sink that is full when a publish arrives
    /// is treated as dead and evicted.
    pub sink_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { sink_capacity: 64 }
    }
}

impl RegistryConfig {
    /// Set the per-subscriber sink capacity
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.sink_capacity, 64);
    }

    #[test]
    fn test_capacity_floor() {
        // A zero-capacity sink could never accept the initial status frame
        let config = RegistryConfig::default().sink_capacity(0);
        assert_eq!(config.sink_capacity, 1);
    }
}
