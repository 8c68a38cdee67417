//! Matrix data model and the block-averaging downsampler.

use std::fmt;
use std::ops::Deref;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Default edge length of a full matrix.
pub const DEFAULT_MATRIX_SIZE: usize = 64;

/// Edge length of the square block folded into one mini-matrix cell.
pub const BLOCK_SIZE: usize = 4;

/// Number of full-matrix cells contributing to one mini-matrix cell.
const BLOCK_CELLS: i32 = (BLOCK_SIZE * BLOCK_SIZE) as i32;

/// Largest value a producer draws for a cell (inclusive).
pub const CELL_MAX: i32 = 256;

/// Check that `size` can be used as a full-matrix edge length.
pub fn validate_matrix_size(size: usize) -> Result<()> {
    if size == 0 || size % BLOCK_SIZE != 0 {
        return Err(Error::MatrixSize(size));
    }
    Ok(())
}

/// A square grid of 32-bit cells stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    cells: Vec<i32>,
}

impl Matrix {
    /// Create a `size` x `size` matrix with every cell set to zero.
    pub fn zeros(size: usize) -> Self {
        Self::filled(size, 0)
    }

    /// Create a `size` x `size` matrix with every cell set to `value`.
    pub fn filled(size: usize, value: i32) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Wrap row-major cells, checking the cell count matches the edge length.
    pub fn from_cells(size: usize, cells: Vec<i32>) -> Result<Self> {
        let expected = size * size;
        if cells.len() != expected {
            return Err(Error::MatrixCells {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> i32 {
        assert!(row < self.size && col < self.size, "index out of bounds");
        self.cells[row * self.size + col]
    }

    /// Iterate over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks_exact(self.size.max(1))
    }

    /// Copy the matrix into nested row vectors.
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.rows().map(<[i32]>::to_vec).collect()
    }
}

/// Serializes as an array of row arrays, the layout the sink expects.
impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// Space-separated dump, one line per row, each value followed by a space.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for value in row {
                write!(f, "{} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A full-resolution matrix whose edge length is a multiple of [`BLOCK_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullMatrix(Matrix);

/// The downsampled matrix produced by [`FullMatrix::downsample`].
pub type MiniMatrix = Matrix;

impl FullMatrix {
    /// Validate the shape of `matrix` and wrap it.
    pub fn new(matrix: Matrix) -> Result<Self> {
        validate_matrix_size(matrix.size())?;
        Ok(Self(matrix))
    }

    /// Build a full matrix from row-major cells.
    pub fn from_cells(size: usize, cells: Vec<i32>) -> Result<Self> {
        Self::new(Matrix::from_cells(size, cells)?)
    }

    /// An all-zero full matrix.
    pub fn zeros(size: usize) -> Result<Self> {
        Self::new(Matrix::zeros(size))
    }

    /// Edge length of the matrix this one downsamples to.
    pub fn mini_size(&self) -> usize {
        self.0.size() / BLOCK_SIZE
    }

    /// Reduce to a mini matrix by 4x4 block averaging.
    ///
    /// Every cell is truncated by 16 before it is accumulated, and the
    /// accumulated block is truncated by 16 again. The result can differ
    /// from a single division of the raw block sum by 256: fifteen 15s and
    /// one 31 yield 0, not 1.
    pub fn downsample(&self) -> MiniMatrix {
        let mini_size = self.mini_size();
        let mut mini = vec![0i32; mini_size * mini_size];

        for (i, row) in self.0.rows().enumerate() {
            for (j, value) in row.iter().enumerate() {
                mini[(i / BLOCK_SIZE) * mini_size + j / BLOCK_SIZE] += value / BLOCK_CELLS;
            }
        }

        for cell in &mut mini {
            *cell /= BLOCK_CELLS;
        }

        Matrix {
            size: mini_size,
            cells: mini,
        }
    }
}

impl Deref for FullMatrix {
    type Target = Matrix;

    fn deref(&self) -> &Matrix {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Seeded random cells in [0, CELL_MAX].
    fn scrambled(size: usize, seed: u64) -> FullMatrix {
        let mut rng = SmallRng::seed_from_u64(seed);
        let cells = (0..size * size)
            .map(|_| rng.random_range(0..=CELL_MAX))
            .collect();
        FullMatrix::from_cells(size, cells).unwrap()
    }

    #[test]
    fn test_all_255_downsamples_to_15() {
        let full = FullMatrix::new(Matrix::filled(DEFAULT_MATRIX_SIZE, 255)).unwrap();
        let mini = full.downsample();

        assert_eq!(mini.size(), 16);
        assert!(mini.cells().iter().all(|&v| v == 15));
    }

    #[test]
    fn test_all_zero_downsamples_to_zero() {
        let mini = FullMatrix::zeros(DEFAULT_MATRIX_SIZE).unwrap().downsample();
        assert_eq!(mini, Matrix::zeros(16));
    }

    #[test]
    fn test_double_truncation_order() {
        // Raw sum is 15 * 15 + 31 = 256, so a single division by 256 gives 1.
        // Truncating per cell first gives 0 * 15 + 1 = 1, then 1 / 16 = 0.
        let mut cells = vec![15; 16];
        cells[0] = 31;
        let full = FullMatrix::from_cells(4, cells).unwrap();
        assert_eq!(full.downsample().cells(), &[0]);

        let full = FullMatrix::new(Matrix::filled(4, 256)).unwrap();
        assert_eq!(full.downsample().cells(), &[16]);
    }

    #[test]
    fn test_blocks_map_to_their_own_cell() {
        let size = 8;
        let cells = (0..size * size)
            .map(|idx| {
                let (i, j) = (idx / size, idx % size);
                if i < 4 && j >= 4 { 160 } else { 0 }
            })
            .collect();
        let mini = FullMatrix::from_cells(size, cells).unwrap().downsample();

        assert_eq!(mini.to_rows(), vec![vec![0, 10], vec![0, 0]]);
    }

    #[test]
    fn test_downsample_range_and_determinism() {
        for seed in 1..20 {
            let full = scrambled(DEFAULT_MATRIX_SIZE, seed);
            let first = full.downsample();
            let second = full.downsample();

            assert_eq!(first, second);
            assert_eq!(first.size(), 16);
            assert!(first.cells().iter().all(|v| (0..=16).contains(v)));
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(matches!(FullMatrix::zeros(0), Err(Error::MatrixSize(0))));
        assert!(matches!(FullMatrix::zeros(30), Err(Error::MatrixSize(30))));
        assert!(FullMatrix::zeros(32).is_ok());
    }

    #[test]
    fn test_from_cells_length_check() {
        let err = Matrix::from_cells(4, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::MatrixCells {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_serialize_as_rows() {
        let matrix = Matrix::from_cells(2, vec![1, 2, 3, 4]).unwrap();
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[1,2],[3,4]]");
    }

    #[test]
    fn test_display_dump() {
        let matrix = Matrix::from_cells(2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(matrix.to_string(), "1 2 \n3 4 \n");
    }
}
