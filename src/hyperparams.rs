#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use ndarray::Array1;

use crate::error::{AdmmError, Result};
use crate::param_guard::ParamGuard;
use crate::Float;

/// Source of the penalty sequence
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub enum LambdaSequence<F> {
    /// Use the given values verbatim and in the given order
    Explicit(Array1<F>),
    /// Generate `n_lambda` log-spaced values from `lambda_max` down to
    /// `lambda_min_ratio * lambda_max`
    ///
    /// When no ratio is given it is chosen from the shape of the design matrix, `1e-4` if
    /// there are more samples than features and `1e-2` otherwise.
    Generated {
        n_lambda: usize,
        lambda_min_ratio: Option<F>,
    },
}

/// How the augmentation parameter `rho` behaves within the iterations of a single penalty
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RhoAdaptation<F> {
    /// Keep `rho = rho_ratio * lambda` for the whole solve
    Fixed,
    /// Residual balancing: scale `rho` by `tau` whenever one residual exceeds the other by
    /// more than a factor `mu`
    Balanced { mu: F, tau: F },
}

/// How consecutive penalties are related
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStrategy {
    /// Solve the penalties in order and start every solve from the previous solution
    Continuation,
    /// Solve every penalty from a cold start. With the `rayon` feature the penalties are solved
    /// in parallel.
    Independent,
}

/// A verified hyper-parameter set ready for the estimation of an elastic-net path
///
/// See [`AdmmParams`](crate::AdmmParams) for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct AdmmValidParams<F> {
    l1_ratio: F,
    lambdas: LambdaSequence<F>,
    standardize: bool,
    with_intercept: bool,
    max_iterations: usize,
    eps_abs: F,
    eps_rel: F,
    rho_ratio: F,
    rho_adaptation: RhoAdaptation<F>,
    strategy: PathStrategy,
    zero_threshold: F,
}

impl<F: Float> AdmmValidParams<F> {
    pub fn l1_ratio(&self) -> F {
        self.l1_ratio
    }

    pub fn lambdas(&self) -> &LambdaSequence<F> {
        &self.lambdas
    }

    pub fn standardize(&self) -> bool {
        self.standardize
    }

    pub fn with_intercept(&self) -> bool {
        self.with_intercept
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn eps_abs(&self) -> F {
        self.eps_abs
    }

    pub fn eps_rel(&self) -> F {
        self.eps_rel
    }

    pub fn rho_ratio(&self) -> F {
        self.rho_ratio
    }

    pub fn rho_adaptation(&self) -> RhoAdaptation<F> {
        self.rho_adaptation
    }

    pub fn strategy(&self) -> PathStrategy {
        self.strategy
    }

    pub fn zero_threshold(&self) -> F {
        self.zero_threshold
    }
}

/// A hyper-parameter set for an elastic-net regularization path
///
/// Configures and minimizes, for every penalty `lambda` of the path, the objective function
/// ```ignore
/// 1 / 2 * ||y - Xw||^2_2
///     + lambda * n_samples * l1_ratio * ||w||_1
///     + 0.5 * lambda * n_samples * (1 - l1_ratio) * ||w||^2_2
/// ```
///
/// The parameter set can be verified into a
/// [`AdmmValidParams`](crate::AdmmValidParams) by calling
/// [ParamGuard::check](crate::ParamGuard::check). It is also possible to directly fit a path
/// with [Fit::fit](crate::traits::Fit::fit) which implicitely verifies the parameter set prior to
/// the estimation and forwards any error.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [l1_ratio](Self::l1_ratio) | `1.0` | Distribution of penalty to L1 and L2 regularizations | `[0.0, 1.0]` |
/// | [lambdas](Self::lambdas) | generated | Explicit penalty sequence | `(0, inf)` |
/// | [n_lambda](Self::n_lambda) | `100` | Number of generated penalties | `[1, inf)` |
/// | [lambda_min_ratio](Self::lambda_min_ratio) | shape dependent | Smallest generated penalty relative to the largest | `(0, 1)` |
/// | [standardize](Self::standardize) | `true` | Scale features to unit variance | `false`, `true` |
/// | [with_intercept](Self::with_intercept) | `true` | Enable intercept | `false`, `true` |
/// | [max_iterations](Self::max_iterations) | `10000` | Maximum number of iterations per penalty | `[1, inf)` |
/// | [eps_abs](Self::eps_abs) | `1e-5` | Absolute tolerance of the residuals | `(0, inf)` |
/// | [eps_rel](Self::eps_rel) | `1e-5` | Relative tolerance of the residuals | `(0, inf)` |
/// | [rho_ratio](Self::rho_ratio) | `0.1` | Augmentation parameter relative to the penalty | `(0, inf)` |
/// | [rho_adaptation](Self::rho_adaptation) | `Fixed` | Adapt the augmentation while iterating | |
/// | [strategy](Self::strategy) | `Continuation` | Warm start consecutive penalties | |
/// | [zero_threshold](Self::zero_threshold) | `0.0` | Coefficients with smaller magnitude are dropped | `[0, inf)` |
///
/// # Errors
///
/// Returns [`InvalidL1Ratio`](AdmmError::InvalidL1Ratio) if the L1 ratio is not in unit
/// range, [`InvalidNLambda`](AdmmError::InvalidNLambda) if no penalty should be generated and
/// [`InvalidLambdaMinRatio`](AdmmError::InvalidLambdaMinRatio) if the ratio is not in `(0, 1)`.
/// Explicit penalties have to be finite and strictly positive. Tolerances, the augmentation
/// ratio and the number of iterations have to be strictly positive.
///
/// # Example
///
/// ```rust
/// use linfa_admm::{AdmmError, AdmmParams, ParamGuard};
/// use linfa_admm::traits::Fit;
/// use ndarray::array;
///
/// let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
/// let y = array![3.0, 2.0, 5.0];
///
/// // create a new parameter set with twenty generated penalties
/// let unchecked_params = AdmmParams::new().n_lambda(20);
///
/// // fit the path with unchecked parameter set
/// let path = unchecked_params.fit(&x, &y)?;
/// assert_eq!(path.lambdas().len(), 20);
///
/// // transform into a verified parameter set
/// let checked_params = unchecked_params.check()?;
///
/// // Regenerate the path with the verified parameters, this only returns
/// // errors originating from the fitting process
/// let path = checked_params.fit(&x, &y)?;
/// # Ok::<(), AdmmError>(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct AdmmParams<F>(AdmmValidParams<F>);

impl<F: Float> Default for AdmmParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configure and fit an elastic-net path
impl<F: Float> AdmmParams<F> {
    /// Create default hyper parameters
    ///
    /// By default a pure LASSO path of one hundred generated penalties is computed on
    /// standardized features with an intercept.
    pub fn new() -> AdmmParams<F> {
        Self(AdmmValidParams {
            l1_ratio: F::one(),
            lambdas: LambdaSequence::Generated {
                n_lambda: 100,
                lambda_min_ratio: None,
            },
            standardize: true,
            with_intercept: true,
            max_iterations: 10_000,
            eps_abs: F::cast(1e-5),
            eps_rel: F::cast(1e-5),
            rho_ratio: F::cast(0.1),
            rho_adaptation: RhoAdaptation::Fixed,
            strategy: PathStrategy::Continuation,
            zero_threshold: F::zero(),
        })
    }

    /// Set l1_ratio parameter of the elastic net. Controls how the penalty is distributed to L1
    /// and L2 regularization.
    /// Setting `l1_ratio` to 1.0 is equivalent to a "Lasso" penalization,
    /// setting it to 0.0 is equivalent to "Ridge" penalization.
    ///
    /// Defaults to `1.0` if not set
    pub fn l1_ratio(mut self, l1_ratio: F) -> Self {
        self.0.l1_ratio = l1_ratio;
        self
    }

    /// Use an explicit penalty sequence. The values are used verbatim, in the given order.
    /// Descending order makes the warm starts effective.
    pub fn lambdas(mut self, lambdas: Array1<F>) -> Self {
        self.0.lambdas = LambdaSequence::Explicit(lambdas);
        self
    }

    /// Generate `n_lambda` penalties. Replaces an explicit sequence.
    pub fn n_lambda(mut self, n_lambda: usize) -> Self {
        let lambda_min_ratio = match self.0.lambdas {
            LambdaSequence::Generated {
                lambda_min_ratio, ..
            } => lambda_min_ratio,
            LambdaSequence::Explicit(_) => None,
        };
        self.0.lambdas = LambdaSequence::Generated {
            n_lambda,
            lambda_min_ratio,
        };
        self
    }

    /// Set the smallest generated penalty relative to the largest one. Replaces an explicit
    /// sequence.
    pub fn lambda_min_ratio(mut self, lambda_min_ratio: F) -> Self {
        let n_lambda = match self.0.lambdas {
            LambdaSequence::Generated { n_lambda, .. } => n_lambda,
            LambdaSequence::Explicit(_) => 100,
        };
        self.0.lambdas = LambdaSequence::Generated {
            n_lambda,
            lambda_min_ratio: Some(lambda_min_ratio),
        };
        self
    }

    /// Scale every centered feature to unit variance before fitting. Coefficients are always
    /// reported on the original scale.
    ///
    /// Defaults to `true` if not set.
    pub fn standardize(mut self, standardize: bool) -> Self {
        self.0.standardize = standardize;
        self
    }

    /// Configure the path to fit an intercept.
    /// Defaults to `true` if not set.
    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.0.with_intercept = with_intercept;
        self
    }

    /// Set the maximum number of iterations for every penalty.
    ///
    /// Defaults to `10000` if not set
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }

    /// Set the absolute tolerance of the primal and dual residuals.
    ///
    /// Defaults to `1e-5` if not set
    pub fn eps_abs(mut self, eps_abs: F) -> Self {
        self.0.eps_abs = eps_abs;
        self
    }

    /// Set the relative tolerance of the primal and dual residuals.
    ///
    /// Defaults to `1e-5` if not set
    pub fn eps_rel(mut self, eps_rel: F) -> Self {
        self.0.eps_rel = eps_rel;
        self
    }

    /// Set the augmentation parameter relative to the (sample scaled) penalty.
    ///
    /// Defaults to `0.1` if not set
    pub fn rho_ratio(mut self, rho_ratio: F) -> Self {
        self.0.rho_ratio = rho_ratio;
        self
    }

    pub fn rho_adaptation(mut self, rho_adaptation: RhoAdaptation<F>) -> Self {
        self.0.rho_adaptation = rho_adaptation;
        self
    }

    pub fn strategy(mut self, strategy: PathStrategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    /// Drop coefficients whose magnitude does not exceed this threshold from the path.
    ///
    /// Defaults to `0.0`, which keeps every coefficient the solver did not zero.
    pub fn zero_threshold(mut self, zero_threshold: F) -> Self {
        self.0.zero_threshold = zero_threshold;
        self
    }
}

impl<F: Float> ParamGuard for AdmmParams<F> {
    type Checked = AdmmValidParams<F>;
    type Error = AdmmError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        let params = &self.0;
        if !(F::zero()..=F::one()).contains(&params.l1_ratio) {
            return Err(AdmmError::InvalidL1Ratio(
                params.l1_ratio.to_f32().unwrap_or(f32::NAN),
            ));
        }

        match &params.lambdas {
            LambdaSequence::Explicit(lambdas) => {
                if lambdas.is_empty() {
                    return Err(AdmmError::EmptyLambdaSequence);
                }
                if let Some(lambda) = lambdas
                    .iter()
                    .find(|lambda| !lambda.is_finite() || **lambda <= F::zero())
                {
                    return Err(AdmmError::InvalidLambda(
                        lambda.to_f32().unwrap_or(f32::NAN),
                    ));
                }
            }
            LambdaSequence::Generated {
                n_lambda,
                lambda_min_ratio,
            } => {
                if *n_lambda < 1 {
                    return Err(AdmmError::InvalidNLambda(*n_lambda));
                }
                if let Some(ratio) = lambda_min_ratio {
                    if !(*ratio > F::zero() && *ratio < F::one()) {
                        return Err(AdmmError::InvalidLambdaMinRatio(
                            ratio.to_f32().unwrap_or(f32::NAN),
                        ));
                    }
                }
            }
        }

        if params.max_iterations < 1 {
            return Err(AdmmError::InvalidMaxIterations(params.max_iterations));
        }
        for tolerance in [params.eps_abs, params.eps_rel] {
            if !(tolerance > F::zero() && tolerance.is_finite()) {
                return Err(AdmmError::InvalidTolerance(
                    tolerance.to_f32().unwrap_or(f32::NAN),
                ));
            }
        }
        if !(params.rho_ratio > F::zero() && params.rho_ratio.is_finite()) {
            return Err(AdmmError::InvalidRhoRatio(
                params.rho_ratio.to_f32().unwrap_or(f32::NAN),
            ));
        }
        if let RhoAdaptation::Balanced { mu, tau } = params.rho_adaptation {
            if !(mu > F::one() && tau > F::one()) {
                return Err(AdmmError::InvalidRhoAdaptation);
            }
        }
        if !(params.zero_threshold >= F::zero()) {
            return Err(AdmmError::InvalidZeroThreshold(
                params.zero_threshold.to_f32().unwrap_or(f32::NAN),
            ));
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn default_params_are_valid() {
        let params = AdmmParams::<f64>::new().check().unwrap();
        assert_eq!(params.l1_ratio(), 1.0);
        assert_eq!(params.max_iterations(), 10_000);
        assert_eq!(params.strategy(), PathStrategy::Continuation);
        assert_eq!(
            params.lambdas(),
            &LambdaSequence::Generated {
                n_lambda: 100,
                lambda_min_ratio: None
            }
        );
    }

    #[test]
    fn generated_sequence_setters_compose() {
        let params = AdmmParams::<f64>::new()
            .lambdas(array![1.0, 0.5])
            .lambda_min_ratio(0.01)
            .n_lambda(7);
        assert_eq!(
            params.check_ref().unwrap().lambdas(),
            &LambdaSequence::Generated {
                n_lambda: 7,
                lambda_min_ratio: Some(0.01)
            }
        );
    }

    #[test]
    fn invalid_l1_ratio() {
        let res = AdmmParams::<f64>::new().l1_ratio(1.5).check();
        assert!(matches!(res, Err(AdmmError::InvalidL1Ratio(_))));
        let res = AdmmParams::<f64>::new().l1_ratio(-0.1).check();
        assert!(matches!(res, Err(AdmmError::InvalidL1Ratio(_))));
    }

    #[test]
    fn invalid_lambda_generation() {
        let res = AdmmParams::<f64>::new().n_lambda(0).check();
        assert!(matches!(res, Err(AdmmError::InvalidNLambda(0))));
        let res = AdmmParams::<f64>::new().lambda_min_ratio(1.0).check();
        assert!(matches!(res, Err(AdmmError::InvalidLambdaMinRatio(_))));
        let res = AdmmParams::<f64>::new().lambda_min_ratio(0.0).check();
        assert!(matches!(res, Err(AdmmError::InvalidLambdaMinRatio(_))));
    }

    #[test]
    fn invalid_explicit_lambdas() {
        let res = AdmmParams::<f64>::new().lambdas(array![]).check();
        assert!(matches!(res, Err(AdmmError::EmptyLambdaSequence)));
        let res = AdmmParams::<f64>::new().lambdas(array![1.0, 0.0]).check();
        assert!(matches!(res, Err(AdmmError::InvalidLambda(_))));
        let res = AdmmParams::<f64>::new()
            .lambdas(array![f64::INFINITY])
            .check();
        assert!(matches!(res, Err(AdmmError::InvalidLambda(_))));
    }

    #[test]
    fn invalid_solver_options() {
        let res = AdmmParams::<f64>::new().max_iterations(0).check();
        assert!(matches!(res, Err(AdmmError::InvalidMaxIterations(0))));
        let res = AdmmParams::<f64>::new().eps_abs(0.0).check();
        assert!(matches!(res, Err(AdmmError::InvalidTolerance(_))));
        let res = AdmmParams::<f64>::new().eps_rel(-1e-3).check();
        assert!(matches!(res, Err(AdmmError::InvalidTolerance(_))));
        let res = AdmmParams::<f64>::new().rho_ratio(0.0).check();
        assert!(matches!(res, Err(AdmmError::InvalidRhoRatio(_))));
        let res = AdmmParams::<f64>::new()
            .rho_adaptation(RhoAdaptation::Balanced { mu: 10.0, tau: 1.0 })
            .check();
        assert!(matches!(res, Err(AdmmError::InvalidRhoAdaptation)));
        let res = AdmmParams::<f64>::new().zero_threshold(-1.0).check();
        assert!(matches!(res, Err(AdmmError::InvalidZeroThreshold(_))));
    }
}
