//! Append-only text log of processed matrices.
//!
//! Each entry is a header line, one line per row with every value followed
//! by a single space, and a trailing blank line:
//!
//! ```text
//! Matrix values:
//! 0 0 0 0 
//! 0 0 0 0 
//! 0 0 0 0 
//! 0 0 0 0 
//!
//! ```

use std::io;
use std::path::{Path, PathBuf};

use matrixflow_common::Matrix;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Header line opening every entry.
pub const ENTRY_HEADER: &str = "Matrix values:";

/// Render one log entry.
pub fn format_entry(matrix: &Matrix) -> String {
    format!("{}\n{}\n", ENTRY_HEADER, matrix)
}

/// Text log that is opened, appended to and closed for every entry.
#[derive(Debug, Clone)]
pub struct MatrixLog {
    path: PathBuf,
}

impl MatrixLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file if needed.
    pub async fn append(&self, matrix: &Matrix) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(format_entry(matrix).as_bytes()).await?;
        file.flush().await
    }
}
