//! Errors raised by the search and its configuration.

use std::path::PathBuf;

use chess_core::Color;
use thiserror::Error;

/// Errors that can occur when loading or validating a [`SearchConfig`](crate::SearchConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has fields of the wrong type.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting is outside its accepted range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Why a search could not start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("asked to search for {requested} but {to_move} is to move")]
    WrongSideToMove { requested: Color, to_move: Color },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_side_message() {
        let err = SearchError::WrongSideToMove {
            requested: Color::Black,
            to_move: Color::White,
        };
        assert_eq!(err.to_string(), "asked to search for Black but White is to move");
    }

    #[test]
    fn invalid_value_message() {
        let err = ConfigError::InvalidValue {
            field: "depth",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for depth: must be at least 1");
    }
}
