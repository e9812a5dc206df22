use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("{}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("conflicting arcs for '{letter}': N{existing} vs N{wanted}")]
    ArcConflict {
        letter: char,
        existing: u32,
        wanted: u32,
    },
    #[error("board row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unexpected board character '{ch}' at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },
    #[error("unexpected rack tile '{ch}'")]
    BadRackTile { ch: char },
    #[error("board file has no rows")]
    EmptyBoard,
}

impl SolverError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
