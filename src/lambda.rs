//! Penalty grid
//!
//! The largest useful penalty `lambda_max` is the smallest one for which the all-zero
//! coefficient vector is optimal. For the objective
//! `1/2 ||y - Xw||^2 + lambda n (alpha ||w||_1 + (1 - alpha)/2 ||w||^2)` the subgradient
//! condition at zero gives `lambda_max = max_j |X_j^T y| / (n alpha)`.
use ndarray::{Array1, ArrayBase, Data, Ix1};

use crate::error::{AdmmError, Result};
use crate::Float;

/// Mixing parameter used to derive `lambda_max` of a pure ridge penalty
///
/// A pure ridge penalty never zeroes all coefficients, so `l1_ratio == 0` is replaced by this
/// value to keep the largest generated penalty finite. Any positive mixing parameter is used
/// as given.
pub const MIN_L1_RATIO_FOR_LAMBDA_MAX: f64 = 1e-3;

/// Effective L1 weight used when deriving `lambda_max`
pub(crate) fn l1_weight<F: Float>(l1_ratio: F) -> F {
    if l1_ratio == F::zero() {
        F::cast(MIN_L1_RATIO_FOR_LAMBDA_MAX)
    } else {
        l1_ratio
    }
}

/// Largest useful penalty from the correlations `X^T y` of standardized data with `n_samples`
/// rows
///
/// For `l1_ratio == 0` the value is finite but only approximately zeroes the coefficients, see
/// [`MIN_L1_RATIO_FOR_LAMBDA_MAX`].
pub fn lambda_max<F: Float, D: Data<Elem = F>>(
    xty: &ArrayBase<D, Ix1>,
    n_samples: usize,
    l1_ratio: F,
) -> F {
    let max_corr = xty.iter().fold(F::zero(), |acc, v| acc.max(v.abs()));

    max_corr / F::cast(n_samples) / l1_weight(l1_ratio)
}

/// Log-spaced, strictly decreasing sequence from `lambda_max` to
/// `lambda_min_ratio * lambda_max`, both ends included
///
/// A single penalty yields just `lambda_max`. A zero `lambda_max`, a response without any
/// correlation to the features, has no grid and is rejected with [`AdmmError::ZeroLambdaMax`].
pub fn generate<F: Float>(
    lambda_max: F,
    n_lambda: usize,
    lambda_min_ratio: F,
) -> Result<Array1<F>> {
    if n_lambda < 1 {
        return Err(AdmmError::InvalidNLambda(n_lambda));
    }
    if !(lambda_min_ratio > F::zero() && lambda_min_ratio < F::one()) {
        return Err(AdmmError::InvalidLambdaMinRatio(
            lambda_min_ratio.to_f32().unwrap_or(f32::NAN),
        ));
    }
    if lambda_max == F::zero() {
        return Err(AdmmError::ZeroLambdaMax);
    }
    if !(lambda_max > F::zero() && lambda_max.is_finite()) {
        return Err(AdmmError::InvalidLambda(
            lambda_max.to_f32().unwrap_or(f32::NAN),
        ));
    }

    if n_lambda == 1 {
        return Ok(Array1::from_elem(1, lambda_max));
    }

    let lambda_min = lambda_min_ratio * lambda_max;
    let mut lambdas = Array1::linspace(lambda_max.ln(), lambda_min.ln(), n_lambda).mapv(F::exp);
    // pin both ends against round-off of exp(ln(.))
    lambdas[0] = lambda_max;
    lambdas[n_lambda - 1] = lambda_min;

    Ok(lambdas)
}

/// Default ratio between smallest and largest generated penalty
///
/// Well determined problems are followed further down the path than problems with more
/// features than samples.
pub fn default_min_ratio<F: Float>(n_samples: usize, n_features: usize) -> F {
    if n_samples > n_features {
        F::cast(1e-4)
    } else {
        F::cast(1e-2)
    }
}
