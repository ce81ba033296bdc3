use crate::{cache::DEFAULT_SPEC_CACHE_CAPACITY, globals::GlobalsConfig, warning::Verbosity};

/// Configuration for embedding the shim.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a valid config.
/// Use `ShimConfig::default()` for stock settings, or build custom settings with the
/// builder methods.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Warning level, the equivalent of `$VERBOSE` at boot.
    pub verbosity: Verbosity,
    /// Distinct format strings remembered per scanner; `0` disables memoization.
    pub spec_cache_capacity: usize,
    /// Values served for runtime globals when no live runtime is attached.
    pub globals: GlobalsConfig,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            spec_cache_capacity: DEFAULT_SPEC_CACHE_CAPACITY,
            globals: GlobalsConfig::default(),
        }
    }
}

impl ShimConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the warning level.
    #[must_use]
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets the format memoization capacity.
    #[must_use]
    pub fn spec_cache_capacity(mut self, capacity: usize) -> Self {
        self.spec_cache_capacity = capacity;
        self
    }

    /// Replaces the runtime global values.
    #[must_use]
    pub fn globals(mut self, globals: GlobalsConfig) -> Self {
        self.globals = globals;
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ShimConfig::from_json("{}").unwrap(), ShimConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            ShimConfig::from_json(r#"{"verbosity": "verbose", "globals": {"field_separator": ","}}"#).unwrap();
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.spec_cache_capacity, DEFAULT_SPEC_CACHE_CAPACITY);
        assert_eq!(config.globals.field_separator.as_deref(), Some(","));
        assert_eq!(config.globals.stdout_fd, 1);
    }

    #[test]
    fn unknown_verbosity_is_rejected() {
        assert!(ShimConfig::from_json(r#"{"verbosity": "loud"}"#).is_err());
    }

    #[test]
    fn builder_methods() {
        let config = ShimConfig::new().verbosity(Verbosity::Silent).spec_cache_capacity(0);
        assert_eq!(config.verbosity, Verbosity::Silent);
        assert_eq!(config.spec_cache_capacity, 0);
    }
}
