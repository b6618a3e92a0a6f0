//! Search configuration, loadable from TOML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Deepest iterative-deepening pass accepted.
pub const MAX_DEPTH: u8 = 32;

/// Tunables for a [`Searcher`](crate::Searcher).
///
/// Every field has a default, so an empty file is a valid configuration:
///
/// ```toml
/// depth = 5
/// cache_capacity = 500000
/// null_window = true
/// time_limit_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Final iterative-deepening depth in plies.
    pub depth: u8,
    /// Maximum number of positions held by the transposition cache.
    pub cache_capacity: usize,
    /// Null-window (negascout) probing of non-first moves; plain alpha-beta when false.
    pub null_window: bool,
    /// Wall-clock budget for one search.
    pub time_limit_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 4,
            cache_capacity: 200_000,
            null_window: true,
            time_limit_ms: None,
        }
    }
}

impl SearchConfig {
    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid TOML, or
    /// [`ConfigError::InvalidValue`] if a setting is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(ConfigError::InvalidValue {
                field: "depth",
                reason: format!("must be between 1 and {MAX_DEPTH}, got {}", self.depth),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "time_limit_ms",
                reason: "must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }

    /// Returns a copy searching to `depth`.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = SearchConfig::from_toml_str("").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.depth, 4);
        assert_eq!(config.cache_capacity, 200_000);
        assert!(config.null_window);
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = SearchConfig::from_toml_str("depth = 6\ntime_limit_ms = 1500\n").unwrap();
        assert_eq!(config.depth, 6);
        assert_eq!(config.time_limit(), Some(Duration::from_millis(1500)));
        assert_eq!(config.cache_capacity, 200_000);
    }

    #[test]
    fn out_of_range_rejected() {
        for text in ["depth = 0", "depth = 33", "cache_capacity = 0", "time_limit_ms = 0"] {
            assert!(
                matches!(
                    SearchConfig::from_toml_str(text),
                    Err(ConfigError::InvalidValue { .. })
                ),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            SearchConfig::from_toml_str("depth = \"deep\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SearchConfig::from_toml_str("dept = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!("search-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "depth = 3\nnull_window = false").unwrap();
        drop(file);

        let config = SearchConfig::load(&path).unwrap();
        assert_eq!(config.depth, 3);
        assert!(!config.null_window);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(SearchConfig::load(&path), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = SearchConfig::default().with_depth(7);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SearchConfig::from_toml_str(&text).unwrap(), config);
    }
}
