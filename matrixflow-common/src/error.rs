use thiserror::Error;

/// Common error type for matrixflow components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Frame size mismatch: expected {expected} bytes, received {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("Invalid matrix size {0}: must be a positive multiple of 4")]
    MatrixSize(usize),

    #[error("Matrix cell count mismatch: expected {expected}, got {actual}")]
    MatrixCells { expected: usize, actual: usize },
}

/// Result type alias using matrixflow's Error.
pub type Result<T> = std::result::Result<T, Error>;
