//! Triplet (COO) accumulator for finite-element assembly
//!
//! Cell contributions are appended in any order; [`TripletMatrix::compress`]
//! sums duplicates and produces the immutable [`CsrMatrix`] used by solvers.
//! No product is available before compression.

use super::csr::CsrMatrix;
use crate::traits::Scalar;
use ndarray::Array2;

/// Coordinate-format accumulator
#[derive(Debug, Clone)]
pub struct TripletMatrix<T: Scalar> {
    num_rows: usize,
    num_cols: usize,
    entries: Vec<(usize, usize, T)>,
}

impl<T: Scalar> TripletMatrix<T> {
    /// Create an empty accumulator of the given shape
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            entries: Vec::new(),
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored (not yet merged) entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `value` to entry (i, j)
    pub fn add(&mut self, i: usize, j: usize, value: T) {
        debug_assert!(
            i < self.num_rows && j < self.num_cols,
            "entry ({i}, {j}) outside {}x{}",
            self.num_rows,
            self.num_cols
        );
        self.entries.push((i, j, value));
    }

    /// Scatter a dense local matrix with the given global indices, skipping zeros
    pub fn add_local(&mut self, indices: &[usize], local: &Array2<T>) {
        assert_eq!(local.nrows(), indices.len(), "local matrix row count mismatch");
        assert_eq!(local.ncols(), indices.len(), "local matrix column count mismatch");
        for (a, &i) in indices.iter().enumerate() {
            for (b, &j) in indices.iter().enumerate() {
                let v = local[[a, b]];
                if v != T::zero() {
                    self.add(i, j, v);
                }
            }
        }
    }

    /// Finalize: merge duplicates into a CSR matrix
    pub fn compress(self) -> CsrMatrix<T> {
        CsrMatrix::from_triplets(self.num_rows, self.num_cols, self.entries)
    }
}
