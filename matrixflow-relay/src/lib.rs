//! Matrix relay for the matrixflow pipeline.
//!
//! The relay accepts producer connections one at a time and reads a single
//! raw frame from each. Frames go through a parity filter on a running
//! counter: even frames are logged, downsampled 4x4 and published to the
//! notification sink, odd frames are dropped.
//!
//! ```text
//! producer ──frame──▶ relay ──┬──▶ matrix_log.txt   (full + mini)
//!                             └──▶ POST /receive_matrix
//! ```

pub mod config;
pub mod listener;
pub mod matrix_log;
pub mod session;

pub use config::{RelayConfig, RelayServiceConfig};
pub use listener::{FrameOutcome, MatrixRelay, RelayError};
pub use matrix_log::MatrixLog;
pub use session::{Admission, RelaySession, RelayStats};
