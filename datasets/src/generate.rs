//! Utility functions for randomly generating regression problems

use ndarray::{s, Array, Array1, Array2, Axis};
use ndarray_rand::{rand::Rng, rand_distr::StandardNormal, RandomExt};

/// A design matrix together with its response and the coefficients it was generated from
#[derive(Debug, Clone)]
pub struct Regression {
    pub records: Array2<f64>,
    pub targets: Array1<f64>,
    pub coef: Array1<f64>,
    pub intercept: f64,
}

/// Gaussian design with a sparse linear response
///
/// The first `n_informative` of `n_features` coefficients are drawn uniformly from
/// `[1, 3]` with random sign, all others are zero. The response is
/// `records.dot(coef) + intercept` plus gaussian noise with standard deviation `noise`.
///
/// # Panics
///
/// If `n_informative` exceeds `n_features`.
pub fn make_regression(
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    noise: f64,
    rng: &mut impl Rng,
) -> Regression {
    let records = Array::random_using((n_samples, n_features), StandardNormal, rng);
    linear_response(records, n_informative, noise, rng)
}

/// Like [`make_regression`], but every pair of features has correlation `rho`
///
/// Each feature is `sqrt(rho) * w + sqrt(1 - rho) * e_j` for a shared gaussian `w` and
/// independent gaussian `e_j`. Strong correlation is the hard case for coordinate-wise
/// methods and stresses the conditioning of the Gram matrix.
///
/// # Panics
///
/// If `rho` is not in `[0, 1)`.
pub fn make_correlated_regression(
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    rho: f64,
    noise: f64,
    rng: &mut impl Rng,
) -> Regression {
    assert!(
        (0.0..1.0).contains(&rho),
        "correlation has to be in [0, 1), is {}",
        rho
    );

    let shared: Array1<f64> = Array::random_using(n_samples, StandardNormal, rng);
    let mut records: Array2<f64> =
        Array::random_using((n_samples, n_features), StandardNormal, rng);
    records *= (1. - rho).sqrt();
    records += &(shared.insert_axis(Axis(1)) * rho.sqrt());

    linear_response(records, n_informative, noise, rng)
}

/// Design with `n_features` orthonormal columns, taken from a Hadamard matrix
///
/// `n_samples` has to be a power of two and at least `n_features`. The Gram matrix of the
/// result is the identity, which makes elastic-net solutions available in closed form.
///
/// # Panics
///
/// If `n_samples` is not a power of two or smaller than `n_features`.
pub fn orthonormal_design(n_samples: usize, n_features: usize) -> Array2<f64> {
    assert!(
        n_samples.is_power_of_two() && n_samples >= n_features,
        "number of samples has to be a power of two and at least the number of features"
    );

    // Sylvester construction
    let mut hadamard = Array2::from_elem((1, 1), 1.0);
    while hadamard.nrows() < n_samples {
        let n = hadamard.nrows();
        let mut next = Array2::zeros((2 * n, 2 * n));
        next.slice_mut(s![..n, ..n]).assign(&hadamard);
        next.slice_mut(s![..n, n..]).assign(&hadamard);
        next.slice_mut(s![n.., ..n]).assign(&hadamard);
        next.slice_mut(s![n.., n..]).assign(&(-&hadamard));
        hadamard = next;
    }

    hadamard.slice(s![.., ..n_features]).to_owned() / (n_samples as f64).sqrt()
}

fn linear_response(
    records: Array2<f64>,
    n_informative: usize,
    noise: f64,
    rng: &mut impl Rng,
) -> Regression {
    let (n_samples, n_features) = records.dim();
    assert!(
        n_informative <= n_features,
        "number of informative features ({}) exceeds number of features ({})",
        n_informative,
        n_features
    );

    let mut coef = Array1::zeros(n_features);
    for c in coef.iter_mut().take(n_informative) {
        let magnitude = rng.gen_range(1.0..3.0);
        *c = if rng.gen::<bool>() {
            magnitude
        } else {
            -magnitude
        };
    }
    let intercept = rng.gen_range(-5.0..5.0);

    let mut targets = records.dot(&coef) + intercept;
    if noise > 0. {
        let noise_sample: Array1<f64> = Array::random_using(n_samples, StandardNormal, rng);
        targets += &(noise_sample * noise);
    }

    Regression {
        records,
        targets,
        coef,
        intercept,
    }
}
