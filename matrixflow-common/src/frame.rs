//! Binary frame codec for the producer to relay transport.
//!
//! A frame is the full matrix as `size * size` 32-bit integers, row-major,
//! in the host's native byte order. There is no header and no checksum, so
//! the receiver recognises a frame by its length alone.
//!
//! Native byte order is kept deliberately: producer and relay must run on
//! hosts with the same endianness or the cells will be garbled.

use crate::error::{Error, Result};
use crate::matrix::{FullMatrix, Matrix};

/// Bytes per matrix cell on the wire.
pub const CELL_BYTES: usize = std::mem::size_of::<i32>();

/// Length in bytes of the frame carrying a `size` x `size` matrix.
pub fn frame_len(size: usize) -> usize {
    size * size * CELL_BYTES
}

/// Encode a matrix into its wire representation.
pub fn encode_frame(matrix: &Matrix) -> Vec<u8> {
    let mut buf = Vec::with_capacity(matrix.cells().len() * CELL_BYTES);
    for value in matrix.cells() {
        buf.extend_from_slice(&value.to_ne_bytes());
    }
    buf
}

/// Decode a frame into a full matrix of edge length `size`.
///
/// Anything other than exactly [`frame_len`] bytes is rejected whole.
pub fn decode_frame(data: &[u8], size: usize) -> Result<FullMatrix> {
    let expected = frame_len(size);
    if data.len() != expected {
        return Err(Error::FrameSize {
            expected,
            actual: data.len(),
        });
    }

    let cells = data
        .chunks_exact(CELL_BYTES)
        .map(|chunk| {
            let mut raw = [0u8; CELL_BYTES];
            raw.copy_from_slice(chunk);
            i32::from_ne_bytes(raw)
        })
        .collect();

    FullMatrix::from_cells(size, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DEFAULT_MATRIX_SIZE;

    #[test]
    fn test_default_frame_len() {
        assert_eq!(frame_len(DEFAULT_MATRIX_SIZE), 16384);
    }

    #[test]
    fn test_native_endian_layout() {
        let matrix = Matrix::from_cells(4, (0..16).collect()).unwrap();
        let frame = encode_frame(&matrix);

        assert_eq!(frame.len(), frame_len(4));
        assert_eq!(&frame[4..8], &1i32.to_ne_bytes());
        assert_eq!(&frame[60..64], &15i32.to_ne_bytes());
    }

    #[test]
    fn test_decode_restores_cells() {
        let matrix = Matrix::from_cells(4, (100..116).collect()).unwrap();
        let decoded = decode_frame(&encode_frame(&matrix), 4).unwrap();

        assert_eq!(decoded.get(0, 0), 100);
        assert_eq!(decoded.get(3, 3), 115);
    }

    #[test]
    fn test_short_frame_rejected() {
        let frame = vec![0u8; frame_len(DEFAULT_MATRIX_SIZE) - 1];
        let err = decode_frame(&frame, DEFAULT_MATRIX_SIZE).unwrap_err();

        assert!(matches!(
            err,
            Error::FrameSize {
                expected: 16384,
                actual: 16383
            }
        ));
    }

    #[test]
    fn test_empty_frame_rejected() {
        assert!(decode_frame(&[], DEFAULT_MATRIX_SIZE).is_err());
    }
}
