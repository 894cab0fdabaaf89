//! Column-wise assembly of the coefficient path
//!
//! Columns arrive one penalty at a time and are only ever appended. The compressed sparse
//! column buffers are filled in place and handed to `sprs` once the last column was written.
use sprs::{CsMat, CsMatBase, CsVec};

use crate::Float;

/// Append-only builder of a `(n_features + 1) x n_lambdas` CSC matrix
///
/// Row `0` holds the intercept, row `i + 1` the coefficient of feature `i`. Exact zeros are
/// never stored.
#[derive(Debug, Clone)]
pub struct PathBuilder<F> {
    n_rows: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<F>,
}

impl<F: Float> PathBuilder<F> {
    /// Reserve room for `n_columns` columns of `nnz_per_column` entries each
    pub fn with_capacity(n_features: usize, n_columns: usize, nnz_per_column: usize) -> Self {
        let mut indptr = Vec::with_capacity(n_columns + 1);
        indptr.push(0);
        let capacity = n_columns * (nnz_per_column + 1);

        PathBuilder {
            n_rows: n_features + 1,
            indptr,
            indices: Vec::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append the next column
    pub fn push_column(&mut self, intercept: F, coef: &CsVec<F>) {
        debug_assert_eq!(coef.dim() + 1, self.n_rows);

        if intercept != F::zero() {
            self.indices.push(0);
            self.data.push(intercept);
        }
        // sparse vectors keep their indices sorted, so rows stay sorted within the column
        for (idx, &val) in coef.iter() {
            if val != F::zero() {
                self.indices.push(idx + 1);
                self.data.push(val);
            }
        }
        self.indptr.push(self.indices.len());
    }

    pub fn n_columns(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Compress the written columns into a CSC matrix
    pub fn finish(self) -> CsMat<F> {
        let n_columns = self.n_columns();
        CsMatBase::new_csc(
            (self.n_rows, n_columns),
            self.indptr,
            self.indices,
            self.data,
        )
    }
}
