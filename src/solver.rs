//! ADMM iterations for a single penalty
//!
//! The elastic-net problem on standardized data is split as
//! ```ignore
//! minimize 1/2 ||y - Xx||^2 + g(z)   subject to x - z = 0
//! g(z) = lambda (alpha ||z||_1 + (1 - alpha)/2 ||z||^2)
//! ```
//! where `lambda` already contains the factor `n_samples`. One cycle consists of
//!
//! * a ridge-like primal update `(X^T X + rho I) x = X^T y + rho (z - u)`,
//! * the elastic-net proximal step `z = S(x + u, lambda alpha / rho) / (1 + lambda (1 - alpha) / rho)`,
//! * the scaled dual ascent `u = u + x - z`.
//!
//! Iterations stop once the primal residual `||x - z||` and the dual residual
//! `rho ||z - z_prev||` fall below their mixed absolute/relative tolerances.
//!
//! References
//! * [Distributed Optimization and Statistical Learning via the Alternating Direction Method
//!   of Multipliers, Boyd et al.](https://web.stanford.edu/~boyd/papers/pdf/admm_distr_stats.pdf)
use log::{debug, trace, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use sprs::CsVec;

use crate::error::{AdmmError, Result};
use crate::factor::GramFactor;
use crate::hyperparams::{AdmmValidParams, RhoAdaptation};
use crate::lambda;
use crate::standardize::StandardizedData;
use crate::Float;

/// Relative slack of the optimality check of the zero vector, raised to a few ulps for `f32`
const ZERO_KKT_SLACK: f64 = 1e-10;

/// Standardized data together with everything derived from it once per path
///
/// The problem is only read while solving, so one instance can back any number of solvers.
#[derive(Debug, Clone)]
pub struct AdmmProblem<F> {
    records: Array2<F>,
    xty: Array1<F>,
    factor: GramFactor<F>,
}

impl<F: Float> AdmmProblem<F> {
    /// Precompute the correlations `X^T y` and factorize the Gram matrix
    pub fn new(data: StandardizedData<F>) -> Result<Self> {
        let StandardizedData { records, targets } = data;
        let xty = records.t().dot(&targets);
        let factor = GramFactor::new(&records.view())?;
        debug!(
            "factorized {:?} Gram matrix of a {}x{} design, largest eigenvalue {:.6e}",
            factor.form(),
            records.nrows(),
            records.ncols(),
            factor.max_eigval()
        );

        Ok(AdmmProblem {
            records,
            xty,
            factor,
        })
    }

    pub fn records(&self) -> ArrayView2<F> {
        self.records.view()
    }

    pub fn xty(&self) -> ArrayView1<F> {
        self.xty.view()
    }

    pub fn factor(&self) -> &GramFactor<F> {
        &self.factor
    }

    pub fn n_samples(&self) -> usize {
        self.records.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.records.ncols()
    }
}

/// Options of the iteration, extracted from the path parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions<F> {
    pub l1_ratio: F,
    pub eps_abs: F,
    pub eps_rel: F,
    pub rho_ratio: F,
    pub rho_adaptation: RhoAdaptation<F>,
    pub zero_threshold: F,
}

impl<F: Float> From<&AdmmValidParams<F>> for SolverOptions<F> {
    fn from(params: &AdmmValidParams<F>) -> Self {
        SolverOptions {
            l1_ratio: params.l1_ratio(),
            eps_abs: params.eps_abs(),
            eps_rel: params.eps_rel(),
            rho_ratio: params.rho_ratio(),
            rho_adaptation: params.rho_adaptation(),
            zero_threshold: params.zero_threshold(),
        }
    }
}

/// Progress of a solver for its current penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    Uninitialized,
    Initialized,
    Converged,
    MaxIterReached,
}

/// Iterates of the method, carried from one penalty to the next in continuation mode
#[derive(Debug, Clone, PartialEq)]
pub struct AdmmState<F> {
    /// primal iterate
    x: Array1<F>,
    /// proximal iterate, exactly sparse
    z: Array1<F>,
    /// scaled dual variable
    u: Array1<F>,
    rho: F,
}

impl<F: Float> AdmmState<F> {
    fn zeros(n_features: usize, rho: F) -> Self {
        AdmmState {
            x: Array1::zeros(n_features),
            z: Array1::zeros(n_features),
            u: Array1::zeros(n_features),
            rho,
        }
    }

    pub fn x(&self) -> &Array1<F> {
        &self.x
    }

    pub fn z(&self) -> &Array1<F> {
        &self.z
    }

    pub fn u(&self) -> &Array1<F> {
        &self.u
    }

    pub fn rho(&self) -> F {
        self.rho
    }
}

/// ADMM solver of the elastic-net problem for one penalty at a time
///
/// The solver borrows a shared [`AdmmProblem`] and exclusively owns its iterates. A cold start
/// ([`init`](Self::init)) zeroes them, a warm start ([`init_warm`](Self::init_warm)) keeps the
/// solution of the previous penalty.
pub struct AdmmSolver<'a, F> {
    problem: &'a AdmmProblem<F>,
    options: SolverOptions<F>,
    lambda: F,
    state: AdmmState<F>,
    status: SolverStatus,
    primal_residual: F,
    dual_residual: F,
}

impl<'a, F: Float> AdmmSolver<'a, F> {
    pub fn new(problem: &'a AdmmProblem<F>, options: SolverOptions<F>) -> Self {
        AdmmSolver {
            problem,
            options,
            lambda: F::zero(),
            state: AdmmState::zeros(problem.n_features(), F::zero()),
            status: SolverStatus::Uninitialized,
            primal_residual: F::infinity(),
            dual_residual: F::infinity(),
        }
    }

    /// Smallest (sample scaled) penalty for which zero is the optimal solution
    ///
    /// Derived from the correlations of the loaded standardized data, see
    /// [`lambda::lambda_max`]. Divide by the number of samples to obtain the penalty on the
    /// scale of the path.
    pub fn lambda_zero(&self) -> F {
        let n_samples = self.problem.n_samples();
        lambda::lambda_max(&self.problem.xty(), n_samples, self.options.l1_ratio)
            * F::cast(n_samples)
    }

    /// Cold start for the (sample scaled) penalty `lambda`
    pub fn init(&mut self, lambda: F) {
        let rho = self.options.rho_ratio * lambda;
        self.state = AdmmState::zeros(self.problem.n_features(), rho);
        self.lambda = lambda;
        self.reset_residuals();
        self.status = SolverStatus::Initialized;
    }

    /// Warm start for the (sample scaled) penalty `lambda` from the current iterates
    ///
    /// `rho` follows the penalty and the scaled dual variable is rescaled, such that the
    /// unscaled multiplier `rho * u` is carried over unchanged.
    pub fn init_warm(&mut self, lambda: F) {
        if self.status == SolverStatus::Uninitialized {
            self.init(lambda);
            return;
        }

        let rho = self.options.rho_ratio * lambda;
        let scale = self.state.rho / rho;
        self.state.u.mapv_inplace(|v| v * scale);
        self.state.rho = rho;
        self.lambda = lambda;
        self.reset_residuals();
        self.status = SolverStatus::Initialized;
    }

    /// Iterate until both residuals meet their tolerance or `max_iter` cycles were run
    ///
    /// Returns the number of cycles executed. Hitting the iteration limit is not an error, the
    /// last iterate is kept and the status becomes [`SolverStatus::MaxIterReached`]. Non-finite
    /// residuals abort with [`AdmmError::NonFinite`].
    ///
    /// # Panics
    ///
    /// If called before [`init`](Self::init) or [`init_warm`](Self::init_warm).
    pub fn solve(&mut self, max_iter: usize) -> Result<usize> {
        assert_ne!(
            self.status,
            SolverStatus::Uninitialized,
            "the solver has to be initialized with a penalty before solving"
        );

        if self.zero_is_optimal() {
            self.set_zero_solution();
            debug!(
                "lambda {:.6e}: zero solution is optimal, no iterations needed",
                self.lambda
            );
            return Ok(0);
        }

        let problem = self.problem;
        let n_features = problem.n_features();
        let sqrt_p = F::cast(n_features).sqrt();
        let records = problem.records();
        let xty = problem.xty();
        let factor = problem.factor();

        let l1_penalty = self.lambda * self.options.l1_ratio;
        let l2_penalty = self.lambda * (F::one() - self.options.l1_ratio);

        let mut z_prev = Array1::zeros(n_features);
        for iter in 1..=max_iter {
            let rho = self.state.rho;

            // primal update
            let rhs = &xty + &((&self.state.z - &self.state.u) * rho);
            self.state.x = factor.solve(&records, rho, &rhs);

            // proximal update
            std::mem::swap(&mut z_prev, &mut self.state.z);
            let threshold = l1_penalty / rho;
            let shrinkage = F::one() + l2_penalty / rho;
            Zip::from(&mut self.state.z)
                .and(&self.state.x)
                .and(&self.state.u)
                .for_each(|z, &x, &u| *z = soft_threshold(x + u, threshold) / shrinkage);

            // dual update
            Zip::from(&mut self.state.u)
                .and(&self.state.x)
                .and(&self.state.z)
                .for_each(|u, &x, &z| *u += x - z);

            let primal = norm(&(&self.state.x - &self.state.z));
            let dual = rho * norm(&(&self.state.z - &z_prev));
            self.primal_residual = primal;
            self.dual_residual = dual;

            if !primal.is_finite() || !dual.is_finite() {
                return Err(AdmmError::NonFinite {
                    lambda: self.lambda.to_f32().unwrap_or(f32::NAN),
                    iteration: iter,
                });
            }

            let eps_primal = sqrt_p * self.options.eps_abs
                + self.options.eps_rel * norm(&self.state.x).max(norm(&self.state.z));
            let eps_dual =
                sqrt_p * self.options.eps_abs + self.options.eps_rel * rho * norm(&self.state.u);

            trace!(
                "iteration {}: primal residual {:.3e} (eps {:.3e}), dual residual {:.3e} (eps {:.3e})",
                iter,
                primal,
                eps_primal,
                dual,
                eps_dual
            );

            if primal <= eps_primal && dual <= eps_dual {
                debug!(
                    "lambda {:.6e}: converged after {} iterations with rho {:.3e}",
                    self.lambda, iter, self.state.rho
                );
                self.status = SolverStatus::Converged;
                return Ok(iter);
            }

            self.adapt_rho(primal, dual);
        }

        warn!(
            "lambda {:.6e}: no convergence after {} iterations (primal residual {:.3e}, dual residual {:.3e})",
            self.lambda, max_iter, self.primal_residual, self.dual_residual
        );
        self.status = SolverStatus::MaxIterReached;

        Ok(max_iter)
    }

    /// Current solution as sparse vector
    ///
    /// The proximal iterate is reported, its zeros are exact. Entries with magnitude at or
    /// below the configured zero threshold are dropped as well.
    pub fn solution(&self) -> CsVec<F> {
        let threshold = self.options.zero_threshold;
        let (indices, data): (Vec<_>, Vec<_>) = self
            .state
            .z
            .iter()
            .enumerate()
            .filter(|(_, v)| v.abs() > threshold)
            .map(|(i, &v)| (i, v))
            .unzip();

        CsVec::new(self.problem.n_features(), indices, data)
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    pub fn state(&self) -> &AdmmState<F> {
        &self.state
    }

    pub fn lambda(&self) -> F {
        self.lambda
    }

    pub fn rho(&self) -> F {
        self.state.rho
    }

    pub fn primal_residual(&self) -> F {
        self.primal_residual
    }

    pub fn dual_residual(&self) -> F {
        self.dual_residual
    }

    /// Subgradient condition of the zero vector, `||X^T y||_inf <= lambda alpha`
    fn zero_is_optimal(&self) -> bool {
        let max_corr = self
            .problem
            .xty
            .iter()
            .fold(F::zero(), |acc, v| acc.max(v.abs()));
        let bound = self.lambda * self.options.l1_ratio;

        let slack = F::cast(ZERO_KKT_SLACK).max(F::epsilon() * F::cast(16));

        max_corr <= bound * (F::one() + slack)
    }

    /// Exact optimum for a penalty above `lambda_zero`, with the matching dual variable
    fn set_zero_solution(&mut self) {
        let rho = self.state.rho;
        self.state.x.fill(F::zero());
        self.state.z.fill(F::zero());
        self.state.u = self.problem.xty.mapv(|v| v / rho);
        self.primal_residual = F::zero();
        self.dual_residual = F::zero();
        self.status = SolverStatus::Converged;
    }

    fn adapt_rho(&mut self, primal: F, dual: F) {
        if let RhoAdaptation::Balanced { mu, tau } = self.options.rho_adaptation {
            if primal > mu * dual {
                self.state.rho *= tau;
                self.state.u.mapv_inplace(|v| v / tau);
            } else if dual > mu * primal {
                self.state.rho /= tau;
                self.state.u.mapv_inplace(|v| v * tau);
            }
        }
    }

    fn reset_residuals(&mut self) {
        self.primal_residual = F::infinity();
        self.dual_residual = F::infinity();
    }
}

/// Proximal operator of `threshold * |.|`
pub fn soft_threshold<F: Float>(value: F, threshold: F) -> F {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        F::zero()
    }
}

fn norm<F: Float>(a: &Array1<F>) -> F {
    a.dot(a).sqrt()
}
