//! Sequential TCP relay.
//!
//! Connections are served one at a time. Each connection carries at most
//! one frame: the relay reads it, closes the connection, waits
//! `accept_delay` and only then accepts the next client. Producers that
//! keep writing after their first frame are cut off when the relay closes.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use matrixflow_common::{PublishOutcome, SinkClient, decode_frame, validate_matrix_size};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream, lookup_host};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::matrix_log::MatrixLog;
use crate::session::{Admission, RelaySession, RelayStats};

/// Errors that stop the relay before it serves anything.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to resolve listen address {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Listen address {0} resolved to nothing")]
    NoAddress(String),
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("Invalid matrix size: {0}")]
    MatrixSize(#[source] matrixflow_common::Error),
}

/// What happened to the frame carried by one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The connection ended before a whole frame arrived.
    Discarded { received: usize },
    /// Reading from the connection failed.
    ReadFailed { reason: String },
    /// Correctly sized frame skipped by the parity filter.
    Dropped { frame: u64 },
    /// Frame logged, downsampled and handed to the sink.
    Processed { frame: u64, publish: PublishOutcome },
}

/// The relay: listening socket plus the state shared by all connections.
pub struct MatrixRelay {
    listener: TcpListener,
    matrix_size: usize,
    frame_len: usize,
    accept_delay: Duration,
    log: MatrixLog,
    sink: SinkClient,
    session: RelaySession,
}

impl MatrixRelay {
    /// Bind the listening socket.
    ///
    /// The address is reusable right after a previous relay exits. Failing
    /// to bind is final; there is no retry.
    pub async fn bind(config: &RelayConfig, sink: SinkClient) -> Result<Self, RelayError> {
        validate_matrix_size(config.matrix_size).map_err(RelayError::MatrixSize)?;

        let addr = lookup_host(&config.listen)
            .await
            .map_err(|source| RelayError::Resolve {
                addr: config.listen.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| RelayError::NoAddress(config.listen.clone()))?;

        let listener =
            listen(addr, config.backlog).map_err(|source| RelayError::Bind { addr, source })?;

        Ok(Self {
            listener,
            matrix_size: config.matrix_size,
            frame_len: config.frame_len(),
            accept_delay: config.accept_delay(),
            log: MatrixLog::new(&config.log_file),
            sink,
            session: RelaySession::new(),
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Current frame counter.
    pub fn frame_counter(&self) -> u64 {
        self.session.frame_counter()
    }

    pub fn stats(&self) -> RelayStats {
        self.session.stats()
    }

    /// Accept one client and handle its frame.
    pub async fn accept_one(&mut self) -> io::Result<(SocketAddr, FrameOutcome)> {
        let (stream, peer) = self.listener.accept().await?;
        info!(peer = %peer, "Connection accepted");
        self.session.record_connection();

        let outcome = self.handle_connection(stream).await;
        Ok((peer, outcome))
    }

    /// Read one frame from `stream` and close it.
    pub async fn handle_connection(&mut self, mut stream: TcpStream) -> FrameOutcome {
        let mut buf = vec![0u8; self.frame_len];
        let read = read_frame(&mut stream, &mut buf).await;
        drop(stream);

        let received = match read {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "Failed to read frame");
                self.session.record_discard();
                return FrameOutcome::ReadFailed {
                    reason: e.to_string(),
                };
            }
        };

        let matrix = match decode_frame(&buf[..received], self.matrix_size) {
            Ok(matrix) => matrix,
            Err(e) => {
                warn!(
                    expected = self.frame_len,
                    received,
                    error = %e,
                    "Discarding incomplete frame"
                );
                self.session.record_discard();
                return FrameOutcome::Discarded { received };
            }
        };

        let frame = match self.session.admit() {
            Admission::Drop { frame } => return FrameOutcome::Dropped { frame },
            Admission::Process { frame } => frame,
        };

        if let Err(e) = self.log.append(&matrix).await {
            error!(frame, path = %self.log.path().display(), error = %e, "Failed to log matrix");
            self.session.record_log_failure();
        }

        let mini = matrix.downsample();

        if let Err(e) = self.log.append(&mini).await {
            error!(
                frame,
                path = %self.log.path().display(),
                error = %e,
                "Failed to log mini matrix"
            );
            self.session.record_log_failure();
        }

        let publish = self.sink.publish_matrices(&matrix, &mini).await;
        match &publish {
            PublishOutcome::Delivered { status } => {
                info!(frame, status, "Matrices published");
            }
            PublishOutcome::Failed { reason } => {
                error!(frame, reason = %reason, "Failed to publish matrices");
            }
        }

        self.session.complete(&publish);
        FrameOutcome::Processed { frame, publish }
    }

    /// Serve connections until the task is cancelled.
    ///
    /// Accept failures are logged and the loop goes on.
    pub async fn run(mut self) {
        match self.local_addr() {
            Ok(addr) => info!(addr = %addr, frame_len = self.frame_len, "Relay listening"),
            Err(e) => warn!(error = %e, "Relay listening on unknown address"),
        }

        loop {
            match self.accept_one().await {
                Ok((peer, outcome)) => {
                    debug!(peer = %peer, outcome = ?outcome, "Connection closed");
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    continue;
                }
            }

            tokio::time::sleep(self.accept_delay).await;
        }
    }
}

/// Create a listening socket with address reuse and the given backlog.
fn listen(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
