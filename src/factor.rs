//! Spectral factorization of the Gram matrix
//!
//! Every primal update of the solver has to solve `(X^T X + rho I) w = b`. Instead of a
//! Cholesky factor, which would have to be recomputed whenever `rho` changes, the symmetric
//! Gram matrix is decomposed once into eigenpairs. Shifting the spectrum by `rho` is then free
//! and the same factorization serves every penalty of the path and every adaptation of `rho`.
//!
//! With more features than samples the `n x n` matrix `X X^T` is decomposed instead and the
//! system is solved with the Woodbury identity
//! `(X^T X + rho I)^-1 b = (b - X^T (X X^T + rho I)^-1 X b) / rho`.
use linfa_linalg::eigh::Eigh;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix1};

use crate::error::Result;
use crate::Float;

/// Space in which the Gram matrix was decomposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GramForm {
    /// `X^T X`, used for `n_features <= n_samples`
    Primal,
    /// `X X^T`, used for `n_features > n_samples`
    Dual,
}

/// Eigendecomposition `V diag(d) V^T` of either `X^T X` or `X X^T`
///
/// The factorization is computed once per path and only read afterwards.
#[derive(Debug, Clone)]
pub struct GramFactor<F> {
    form: GramForm,
    eigvals: Array1<F>,
    eigvecs: Array2<F>,
}

impl<F: Float> GramFactor<F> {
    /// Decompose the Gram matrix of `records` in the smaller of both spaces
    pub fn new(records: &ArrayView2<F>) -> Result<Self> {
        let (n_samples, n_features) = records.dim();
        let (form, gram) = if n_features <= n_samples {
            (GramForm::Primal, records.t().dot(records))
        } else {
            (GramForm::Dual, records.dot(&records.t()))
        };

        let (eigvals, eigvecs) = gram.eigh()?;
        // the spectrum is non-negative, anything below is round-off
        let eigvals = eigvals.mapv(|v| v.max(F::zero()));

        Ok(GramFactor {
            form,
            eigvals,
            eigvecs,
        })
    }

    pub fn form(&self) -> GramForm {
        self.form
    }

    pub fn eigvals(&self) -> &Array1<F> {
        &self.eigvals
    }

    /// Largest eigenvalue of the Gram matrix, shared by `X^T X` and `X X^T`
    pub fn max_eigval(&self) -> F {
        self.eigvals.iter().fold(F::zero(), |acc, &v| acc.max(v))
    }

    /// Solve `(X^T X + rho I) w = rhs` for `rho > 0`
    ///
    /// `records` has to be the matrix this factorization was computed from.
    pub fn solve<D: Data<Elem = F>>(
        &self,
        records: &ArrayView2<F>,
        rho: F,
        rhs: &ArrayBase<D, Ix1>,
    ) -> Array1<F> {
        match self.form {
            GramForm::Primal => self.shifted_inverse(rho, rhs),
            GramForm::Dual => {
                let projected = records.dot(rhs);
                let inner = self.shifted_inverse(rho, &projected);
                (rhs - &records.t().dot(&inner)) / rho
            }
        }
    }

    /// `V diag(1 / (d + rho)) V^T b`
    fn shifted_inverse<D: Data<Elem = F>>(&self, rho: F, rhs: &ArrayBase<D, Ix1>) -> Array1<F> {
        let mut coords = self.eigvecs.t().dot(rhs);
        coords
            .iter_mut()
            .zip(self.eigvals.iter())
            .for_each(|(c, &d)| *c /= d + rho);

        self.eigvecs.dot(&coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::StandardNormal;
    use ndarray_rand::RandomExt;
    use rand::rngs::SmallRng;

    fn check_solution(records: &Array2<f64>, rho: f64) {
        let factor = GramFactor::new(&records.view()).unwrap();
        let rhs = Array1::linspace(-1., 2., records.ncols());
        let sol = factor.solve(&records.view(), rho, &rhs);

        let lhs = records.t().dot(&records.dot(&sol)) + &sol * rho;
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-8);
    }

    #[test]
    fn primal_form_for_tall_matrices() {
        let mut rng = SmallRng::seed_from_u64(42);
        let records = Array::random_using((30, 5), StandardNormal, &mut rng);
        let factor = GramFactor::new(&records.view()).unwrap();
        assert_eq!(factor.form(), GramForm::Primal);
        assert_eq!(factor.eigvals().len(), 5);

        for rho in [1e-3, 0.5, 20.] {
            check_solution(&records, rho);
        }
    }

    #[test]
    fn dual_form_for_wide_matrices() {
        let mut rng = SmallRng::seed_from_u64(7);
        let records = Array::random_using((6, 25), StandardNormal, &mut rng);
        let factor = GramFactor::new(&records.view()).unwrap();
        assert_eq!(factor.form(), GramForm::Dual);
        assert_eq!(factor.eigvals().len(), 6);

        for rho in [0.1, 1., 50.] {
            check_solution(&records, rho);
        }
    }

    #[test]
    fn rank_deficient_gram_is_regularized() {
        // second column duplicates the first one
        let records = array![[1., 1., 0.], [2., 2., 1.], [3., 3., -1.], [0., 0., 2.]];
        let factor = GramFactor::new(&records.view()).unwrap();
        assert!(factor.eigvals().iter().all(|&d| d >= 0.));

        check_solution(&records, 0.25);
    }

    #[test]
    fn largest_eigenvalue_of_orthonormal_columns() {
        let records = array![[0.5, 0.5], [0.5, -0.5], [0.5, 0.5], [0.5, -0.5]];
        let factor = GramFactor::new(&records.view()).unwrap();
        assert_abs_diff_eq!(factor.max_eigval(), 1., epsilon = 1e-12);
    }
}
