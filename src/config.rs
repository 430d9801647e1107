//! Configuration for keyspace
//!
//! Per-namespace settings with sensible defaults.

use crate::error::{KeyspaceError, Result};

/// Configuration for a namespace handle
#[derive(Debug, Clone, Default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cascade Configuration
    // -------------------------------------------------------------------------
    /// Maximum nesting of namespace pre-hooks during one cascade.
    ///
    /// `None` (the default) means unbounded: a hook chain that loops back
    /// into itself recurses until the stack runs out. Setting a limit turns
    /// that into a `CascadeDepthExceeded` error and an aborted write.
    pub max_cascade_depth: Option<usize>,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.max_cascade_depth == Some(0) {
            return Err(KeyspaceError::Config(
                "max_cascade_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Limit how deep pre-hooks may chain across namespaces
    pub fn max_cascade_depth(mut self, depth: usize) -> Self {
        self.config.max_cascade_depth = Some(depth);
        self
    }

    /// Remove any cascade depth limit
    pub fn unbounded_cascades(mut self) -> Self {
        self.config.max_cascade_depth = None;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
