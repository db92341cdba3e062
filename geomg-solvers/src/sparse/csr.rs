//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: Non-zero entries in row-major order
//! - `col_indices`: Column index for each value
//! - `row_ptrs`: Index into values/col_indices where each row starts

use crate::traits::{LinearOperator, Scalar};
use ndarray::{Array1, Array2};
use std::ops::Range;

#[cfg(feature = "native")]
use rayon::prelude::*;

/// Row count above which the mat-vec is split across the rayon pool
#[cfg(feature = "native")]
const PARALLEL_ROW_THRESHOLD: usize = 246;

/// Compressed Sparse Row (CSR) matrix format
///
/// Memory-efficient storage for sparse matrices with O(nnz) space complexity.
/// Matrix-vector products are O(nnz) instead of O(n²) for dense matrices.
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: Scalar> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value, sorted within each row
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of non-zeros)
    pub row_ptrs: Vec<usize>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Create a new empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create a CSR matrix from a dense matrix, dropping entries below `threshold`
    pub fn from_dense(dense: &Array2<T>, threshold: T) -> Self {
        let (num_rows, num_cols) = dense.dim();
        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        row_ptrs.push(0);

        for i in 0..num_rows {
            for j in 0..num_cols {
                let v = dense[[i, j]];
                if !v.is_zero_approx(threshold) {
                    values.push(v);
                    col_indices.push(j);
                }
            }
            row_ptrs.push(values.len());
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create a CSR matrix from COO (triplet) format
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        triplets.sort_unstable_by_key(|&(i, j, _)| (i, j));

        let mut row_ptrs = vec![0usize; num_rows + 1];
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (i, j, v) in triplets {
            debug_assert!(i < num_rows && j < num_cols, "triplet ({i}, {j}) out of range");
            if last == Some((i, j)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            col_indices.push(j);
            values.push(v);
            row_ptrs[i + 1] += 1;
            last = Some((i, j));
        }

        for i in 0..num_rows {
            row_ptrs[i + 1] += row_ptrs[i];
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Create an identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![T::one(); n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Get the number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Iterate over the `(column, value)` pairs stored in a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.row_range(row)
            .map(move |idx| (self.col_indices[idx], self.values[idx]))
    }

    /// Matrix-vector product: y = A * x
    ///
    /// Uses parallel processing when the `native` feature is enabled and the
    /// matrix is large enough to benefit from parallelization.
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        #[cfg(feature = "native")]
        {
            if self.num_rows >= PARALLEL_ROW_THRESHOLD {
                return self.matvec_parallel(x);
            }
        }

        self.matvec_sequential(x)
    }

    fn row_dot(&self, row: usize, x: &Array1<T>) -> T {
        self.row_range(row).fold(T::zero(), |sum, idx| {
            sum + self.values[idx] * x[self.col_indices[idx]]
        })
    }

    fn matvec_sequential(&self, x: &Array1<T>) -> Array1<T> {
        Array1::from_iter((0..self.num_rows).map(|i| self.row_dot(i, x)))
    }

    #[cfg(feature = "native")]
    fn matvec_parallel(&self, x: &Array1<T>) -> Array1<T> {
        let results: Vec<T> = (0..self.num_rows)
            .into_par_iter()
            .map(|i| self.row_dot(i, x))
            .collect();
        Array1::from_vec(results)
    }

    /// Transpose matrix-vector product: y = A^T * x
    pub fn matvec_transpose(&self, x: &Array1<T>) -> Array1<T> {
        let mut y = Array1::from_elem(self.num_cols, T::zero());
        self.matvec_transpose_add(x, &mut y);
        y
    }

    /// Transpose matrix-vector product with accumulation: y += A^T * x
    pub fn matvec_transpose_add(&self, x: &Array1<T>, y: &mut Array1<T>) {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");
        assert_eq!(y.len(), self.num_cols, "Output vector size mismatch");

        for i in 0..self.num_rows {
            let xi = x[i];
            if xi == T::zero() {
                continue;
            }
            for idx in self.row_range(i) {
                y[self.col_indices[idx]] += self.values[idx] * xi;
            }
        }
    }

    /// Get element at (i, j), returns zero if not present
    pub fn get(&self, i: usize, j: usize) -> T {
        let range = self.row_range(i);
        match self.col_indices[range.clone()].binary_search(&j) {
            Ok(offset) => self.values[range.start + offset],
            Err(_) => T::zero(),
        }
    }

    /// Extract diagonal elements
    pub fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        Array1::from_iter((0..n).map(|i| self.get(i, i)))
    }

    /// Explicit transpose, mainly for checks against lazy transposed views
    pub fn transpose(&self) -> Self {
        let triplets = (0..self.num_rows)
            .flat_map(|i| self.row_entries(i).map(move |(j, v)| (j, i, v)))
            .collect();
        Self::from_triplets(self.num_cols, self.num_rows, triplets)
    }

    /// Residual r = b - A x
    pub fn residual(&self, x: &Array1<T>, b: &Array1<T>) -> Array1<T> {
        b - &self.matvec(x)
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());
        for i in 0..self.num_rows {
            for (j, v) in self.row_entries(i) {
                dense[[i, j]] = v;
            }
        }
        dense
    }
}

impl<T: Scalar> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec_transpose(x)
    }
}
