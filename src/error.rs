//! Error types for the engine, its configuration and board parsing.
use std::path::PathBuf;

/// Contract violations raised by the board and the cascade controller.
///
/// An invalid *move* is not an error: it is reported as
/// [`MoveOutcome::Rejected`](crate::cascade::MoveOutcome::Rejected).
/// Any operation returning one of these errors leaves the board untouched.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("cell index {index} is out of range for a board of {len} cells")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("the board is resolving a cascade and cannot accept moves")]
    Busy,

    #[error("a board of side {side} needs {expected} cells, found {found}")]
    CellCount {
        side: usize,
        expected: usize,
        found: usize,
    },

    #[error("board side {found} does not match the configured side {expected}")]
    SideMismatch { expected: usize, found: usize },

    #[error("could not generate a match-free board after {attempts} attempts")]
    UnstableStart { attempts: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur when loading or validating an
/// [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors produced by [`board_from_str_array`](crate::utils::board_from_str_array).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("a board needs at least one row")]
    NoRows,

    #[error("row {row} has {found} characters, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnknownTile { ch: char, row: usize, col: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::IndexOutOfRange { index: 64, len: 64 };
        assert_eq!(
            err.to_string(),
            "cell index 64 is out of range for a board of 64 cells"
        );
        assert_eq!(
            EngineError::Busy.to_string(),
            "the board is resolving a cascade and cannot accept moves"
        );
    }

    #[test]
    fn test_config_error_wraps_into_engine_error() {
        let err: EngineError = ConfigError::Validation("side must be > 0".into()).into();
        assert_eq!(
            err.to_string(),
            "configuration error: config validation error: side must be > 0"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = BoardParseError::UnknownTile {
            ch: 'X',
            row: 1,
            col: 2,
        };
        assert_eq!(err.to_string(), "unrecognized character 'X' in row 1 col 2");
    }
}
