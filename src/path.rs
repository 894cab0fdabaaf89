//! Regularization path over a sequence of penalties
//!
//! The data is standardized and factorized once. Every penalty of the sequence is then solved
//! by [`AdmmSolver`], the solution is mapped back to the original feature scale and appended as
//! a column to a sparse coefficient matrix.
use std::cmp::Ordering;
use std::ops::ControlFlow;

use log::{debug, info};
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2};
use sprs::{CsMat, CsVec};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{AdmmError, Result};
use crate::hyperparams::{AdmmValidParams, LambdaSequence, PathStrategy};
use crate::lambda;
use crate::path_matrix::PathBuilder;
use crate::solver::{AdmmProblem, AdmmSolver, SolverOptions, SolverStatus};
use crate::standardize::Standardizer;
use crate::traits::{Fit, PredictInplace};
use crate::Float;

/// Elastic-net coefficients for every penalty of a path
///
/// The coefficient matrix has `n_features + 1` rows and one column per penalty. Row `0` holds
/// the intercept, row `i + 1` the coefficient of feature `i`, both on the scale of the original
/// data.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ElasticNetPath<F> {
    lambdas: Array1<F>,
    coef_path: CsMat<F>,
    n_iterations: Vec<usize>,
    converged: Vec<bool>,
}

/// Summary of a freshly written column, handed to the monitor of
/// [`fit_with_monitor`](AdmmValidParams::fit_with_monitor)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep<F> {
    /// position of the penalty in the sequence
    pub index: usize,
    pub lambda: F,
    pub iterations: usize,
    pub converged: bool,
    /// number of non-zero coefficients, without the intercept
    pub nnz: usize,
}

/// Solution of a single penalty on the original scale
struct PathColumn<F> {
    intercept: F,
    coef: CsVec<F>,
    iterations: usize,
    converged: bool,
}

/// Collects columns in the order of the penalty sequence
struct PathAssembler<F> {
    builder: PathBuilder<F>,
    lambdas: Vec<F>,
    n_iterations: Vec<usize>,
    converged: Vec<bool>,
}

impl<F: Float> PathAssembler<F> {
    fn new(n_samples: usize, n_features: usize, n_lambdas: usize) -> Self {
        PathAssembler {
            builder: PathBuilder::with_capacity(
                n_features,
                n_lambdas,
                n_samples.min(n_features),
            ),
            lambdas: Vec::with_capacity(n_lambdas),
            n_iterations: Vec::with_capacity(n_lambdas),
            converged: Vec::with_capacity(n_lambdas),
        }
    }

    fn write(&mut self, lambda: F, column: PathColumn<F>) -> PathStep<F> {
        let step = PathStep {
            index: self.lambdas.len(),
            lambda,
            iterations: column.iterations,
            converged: column.converged,
            nnz: column.coef.nnz(),
        };
        debug!(
            "lambda[{}] = {:.6e}: {} iterations, {} non-zero coefficients{}",
            step.index,
            lambda,
            step.iterations,
            step.nnz,
            if step.converged { "" } else { ", not converged" }
        );

        self.builder.push_column(column.intercept, &column.coef);
        self.lambdas.push(lambda);
        self.n_iterations.push(column.iterations);
        self.converged.push(column.converged);

        step
    }

    fn finish(self) -> ElasticNetPath<F> {
        debug!(
            "assembled path with {} columns and {} stored entries",
            self.builder.n_columns(),
            self.builder.nnz()
        );

        ElasticNetPath {
            lambdas: Array1::from(self.lambdas),
            coef_path: self.builder.finish(),
            n_iterations: self.n_iterations,
            converged: self.converged,
        }
    }
}

impl<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, AdmmError> for AdmmValidParams<F>
{
    type Object = ElasticNetPath<F>;

    /// Fit an elastic-net path to a design matrix and a response
    ///
    /// The data is copied before it is centered and scaled, the caller's arrays are only read.
    ///
    /// # Errors
    ///
    /// Fails on inconsistent or non-finite input, when no penalty grid can be generated and
    /// when an iterate diverges.
    fn fit(
        &self,
        records: &ArrayBase<D, Ix2>,
        targets: &ArrayBase<T, Ix1>,
    ) -> Result<Self::Object> {
        self.fit_with_monitor(records, targets, |_| ControlFlow::Continue(()))
    }
}

impl<F: Float> AdmmValidParams<F> {
    /// Fit a path and report every written column to `monitor`
    ///
    /// The monitor is called once per penalty, in the order of the sequence, right after the
    /// column was written. Returning [`ControlFlow::Break`] stops the path early, the returned
    /// path then only contains the columns written so far.
    pub fn fit_with_monitor<D, T, M>(
        &self,
        records: &ArrayBase<D, Ix2>,
        targets: &ArrayBase<T, Ix1>,
        mut monitor: M,
    ) -> Result<ElasticNetPath<F>>
    where
        D: Data<Elem = F>,
        T: Data<Elem = F>,
        M: FnMut(&PathStep<F>) -> ControlFlow<()>,
    {
        let (standardizer, data) = Standardizer::standardize(
            records,
            targets,
            self.standardize(),
            self.with_intercept(),
        )?;
        let problem = AdmmProblem::new(data)?;
        let options = SolverOptions::from(self);
        let lambdas = self.resolve_lambdas(&problem, options)?;

        let (n_samples, n_features) = (problem.n_samples(), problem.n_features());
        info!(
            "fitting elastic-net path with {} penalties on {} samples and {} features",
            lambdas.len(),
            n_samples,
            n_features
        );
        let n_constant = standardizer.constant_features().iter().filter(|&&c| c).count();
        if n_constant > 0 {
            debug!("{} constant features are excluded from scaling", n_constant);
        }

        let n = F::cast(n_samples);
        let max_iter = self.max_iterations();
        let mut assembler = PathAssembler::new(n_samples, n_features, lambdas.len());

        match self.strategy() {
            PathStrategy::Continuation => {
                let mut solver = AdmmSolver::new(&problem, options);
                for (idx, &lambda) in lambdas.iter().enumerate() {
                    if idx == 0 {
                        solver.init(lambda * n);
                    } else {
                        solver.init_warm(lambda * n);
                    }
                    let iterations = solver.solve(max_iter)?;
                    let column = recover_column(&standardizer, &solver, iterations);

                    let step = assembler.write(lambda, column);
                    if monitor(&step).is_break() {
                        break;
                    }
                }
            }
            #[cfg(feature = "rayon")]
            PathStrategy::Independent => {
                let columns = lambdas
                    .to_vec()
                    .into_par_iter()
                    .map(|lambda| solve_cold(&problem, options, &standardizer, lambda, max_iter))
                    .collect::<Result<Vec<_>>>()?;

                for (&lambda, column) in lambdas.iter().zip(columns) {
                    let step = assembler.write(lambda, column);
                    if monitor(&step).is_break() {
                        break;
                    }
                }
            }
            #[cfg(not(feature = "rayon"))]
            PathStrategy::Independent => {
                for &lambda in lambdas.iter() {
                    let column = solve_cold(&problem, options, &standardizer, lambda, max_iter)?;

                    let step = assembler.write(lambda, column);
                    if monitor(&step).is_break() {
                        break;
                    }
                }
            }
        }

        Ok(assembler.finish())
    }

    /// Explicit penalties verbatim, otherwise a grid below the largest useful penalty
    fn resolve_lambdas(
        &self,
        problem: &AdmmProblem<F>,
        options: SolverOptions<F>,
    ) -> Result<Array1<F>> {
        match self.lambdas() {
            LambdaSequence::Explicit(lambdas) => Ok(lambdas.clone()),
            LambdaSequence::Generated {
                n_lambda,
                lambda_min_ratio,
            } => {
                let n_samples = problem.n_samples();
                let lambda_max =
                    AdmmSolver::new(problem, options).lambda_zero() / F::cast(n_samples);
                let ratio = lambda_min_ratio.unwrap_or_else(|| {
                    lambda::default_min_ratio(n_samples, problem.n_features())
                });
                debug!(
                    "generating {} penalties from lambda_max = {:.6e} with ratio {:.1e}",
                    n_lambda, lambda_max, ratio
                );

                lambda::generate(lambda_max, *n_lambda, ratio)
            }
        }
    }
}

fn recover_column<F: Float>(
    standardizer: &Standardizer<F>,
    solver: &AdmmSolver<F>,
    iterations: usize,
) -> PathColumn<F> {
    let (intercept, coef) = standardizer.recover(&solver.solution());

    PathColumn {
        intercept,
        coef,
        iterations,
        converged: solver.status() == SolverStatus::Converged,
    }
}

fn solve_cold<F: Float>(
    problem: &AdmmProblem<F>,
    options: SolverOptions<F>,
    standardizer: &Standardizer<F>,
    lambda: F,
    max_iter: usize,
) -> Result<PathColumn<F>> {
    let mut solver = AdmmSolver::new(problem, options);
    solver.init(lambda * F::cast(problem.n_samples()));
    let iterations = solver.solve(max_iter)?;

    Ok(recover_column(standardizer, &solver, iterations))
}

/// View the path
impl<F: Float> ElasticNetPath<F> {
    /// Penalties in the order they were solved
    pub fn lambdas(&self) -> &Array1<F> {
        &self.lambdas
    }

    /// Sparse `(n_features + 1) x n_lambdas` matrix in compressed sparse column format
    pub fn coef_path(&self) -> &CsMat<F> {
        &self.coef_path
    }

    /// Number of iterations spent on each penalty, zero when the zero solution was optimal
    pub fn n_iterations(&self) -> &[usize] {
        &self.n_iterations
    }

    /// Whether the solve of each penalty met its tolerance before the iteration limit
    pub fn converged(&self) -> &[bool] {
        &self.converged
    }

    pub fn n_lambdas(&self) -> usize {
        self.lambdas.len()
    }

    pub fn n_features(&self) -> usize {
        self.coef_path.rows() - 1
    }

    /// Intercepts of every penalty
    pub fn intercepts(&self) -> Array1<F> {
        (0..self.n_lambdas())
            .map(|j| self.coef_path.get(0, j).copied().unwrap_or_else(F::zero))
            .collect()
    }

    /// Intercept and dense coefficients of the `j`-th penalty
    ///
    /// # Panics
    ///
    /// If `j` is out of bounds.
    pub fn coefficients(&self, j: usize) -> (F, Array1<F>) {
        assert!(
            j < self.n_lambdas(),
            "penalty index {} out of bounds for a path of length {}",
            j,
            self.n_lambdas()
        );

        let mut intercept = F::zero();
        let mut coef = Array1::zeros(self.n_features());
        if let Some(column) = self.coef_path.outer_view(j) {
            for (row, &val) in column.iter() {
                if row == 0 {
                    intercept = val;
                } else {
                    coef[row - 1] = val;
                }
            }
        }

        (intercept, coef)
    }

    /// Number of non-zero coefficients, without the intercept, for every penalty
    pub fn degrees_of_freedom(&self) -> Vec<usize> {
        (0..self.n_lambdas())
            .map(|j| {
                self.coef_path
                    .outer_view(j)
                    .map(|column| column.iter().filter(|(row, _)| *row > 0).count())
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Coefficients for an arbitrary penalty, linearly interpolated between the two
    /// neighbouring penalties of the path
    ///
    /// Penalties outside of the range of the path are clamped to its nearest end.
    ///
    /// # Panics
    ///
    /// If the path is empty.
    pub fn coefficients_at(&self, lambda: F) -> (F, Array1<F>) {
        assert!(self.n_lambdas() > 0, "the path contains no penalty");

        let mut order = (0..self.n_lambdas()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            self.lambdas[a]
                .partial_cmp(&self.lambdas[b])
                .unwrap_or(Ordering::Equal)
        });

        let (smallest, largest) = (order[0], order[order.len() - 1]);
        if lambda <= self.lambdas[smallest] {
            return self.coefficients(smallest);
        }
        if lambda >= self.lambdas[largest] {
            return self.coefficients(largest);
        }

        for pair in order.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let (lambda_lo, lambda_hi) = (self.lambdas[lo], self.lambdas[hi]);
            if lambda < lambda_lo || lambda > lambda_hi {
                continue;
            }
            if lambda_hi == lambda_lo {
                return self.coefficients(lo);
            }

            let weight = (lambda - lambda_lo) / (lambda_hi - lambda_lo);
            let (intercept_lo, coef_lo) = self.coefficients(lo);
            let (intercept_hi, coef_hi) = self.coefficients(hi);

            return (
                intercept_lo + (intercept_hi - intercept_lo) * weight,
                &coef_lo + &((&coef_hi - &coef_lo) * weight),
            );
        }

        self.coefficients(largest)
    }

    /// Predict the response with the coefficients of the `j`-th penalty
    pub fn predict_at<D: Data<Elem = F>>(
        &self,
        j: usize,
        records: &ArrayBase<D, Ix2>,
    ) -> Array1<F> {
        let (intercept, coef) = self.coefficients(j);
        records.dot(&coef) + intercept
    }

    /// Extract the linear model of the `j`-th penalty
    pub fn model_at(&self, j: usize) -> PathModel<F> {
        let (intercept, hyperplane) = self.coefficients(j);

        PathModel {
            lambda: self.lambdas[j],
            intercept,
            hyperplane,
        }
    }
}

/// Linear model taken from a single penalty of an [`ElasticNetPath`]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PathModel<F> {
    lambda: F,
    intercept: F,
    hyperplane: Array1<F>,
}

impl<F: Float> PathModel<F> {
    /// Penalty this model was fitted with
    pub fn lambda(&self) -> F {
        self.lambda
    }

    pub fn intercept(&self) -> F {
        self.intercept
    }

    /// Get the fitted hyperplane
    pub fn hyperplane(&self) -> &Array1<F> {
        &self.hyperplane
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for PathModel<F> {
    /// Given an input matrix `X`, with shape `(n_samples, n_features)`,
    /// `predict` returns the target variable according to the linear model
    /// learned from the training data distribution.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.hyperplane) + self.intercept;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}
