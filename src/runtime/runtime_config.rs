//! Runtime configuration.

use tracing::warn;

/// Tunables for one execution run.
///
/// Defaults are sensible for interactive use; every field can be overridden
/// through the environment (`YAWL_GUARD_COMMAND`, `YAWL_RECURSION_LIMIT`,
/// `YAWL_UNWRAP_DEPTH`, `YAWL_CHUNK_SIZE`) or the CLI flags.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// The reserved command name with guard semantics: nonzero exit
    /// suppresses the box's output (resolves to "no value") instead of
    /// being merely informational.
    pub guard_command: String,
    /// Maximum alias re-entry depth before a run is declared runaway.
    pub recursion_limit: usize,
    /// Nesting budget for the unwrap discipline's cycle guard.
    pub unwrap_depth: usize,
    /// Chunk size for stream pumps.
    pub chunk_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            guard_command: "test".to_string(),
            recursion_limit: 256,
            unwrap_depth: 64,
            chunk_size: super::value::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with any `YAWL_*` environment overrides.
    ///
    /// Loads a `.env` file first if one is present, matching how the rest
    /// of the ambient configuration behaves.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(name) = std::env::var("YAWL_GUARD_COMMAND")
            && !name.is_empty()
        {
            config.guard_command = name;
        }
        config.recursion_limit =
            env_usize("YAWL_RECURSION_LIMIT").unwrap_or(config.recursion_limit);
        config.unwrap_depth = env_usize("YAWL_UNWRAP_DEPTH").unwrap_or(config.unwrap_depth);
        config.chunk_size = env_usize("YAWL_CHUNK_SIZE").unwrap_or(config.chunk_size);
        config
    }

    /// Override the guard command name.
    #[must_use]
    pub fn with_guard_command(mut self, name: impl Into<String>) -> Self {
        self.guard_command = name.into();
        self
    }

    /// Override the alias recursion limit.
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(%key, %raw, "ignoring unparseable environment override");
            None
        }
    }
}
