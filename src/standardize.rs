//! Centering and scaling of the design matrix and the response
//!
//! The solver works on a working copy of the data where every feature is centered (when an
//! intercept is fitted) and scaled to unit variance (when standardization is requested). The
//! response is only centered. Coefficients found on the working copy are mapped back to the
//! scale of the original features with [`Standardizer::recover`].
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
use sprs::CsVec;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{AdmmError, Result};
use crate::Float;

/// Design matrix and response after centering and scaling
#[derive(Debug, Clone)]
pub struct StandardizedData<F> {
    pub records: Array2<F>,
    pub targets: Array1<F>,
}

/// Statistics needed to move between original and standardized scale
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer<F> {
    x_means: Array1<F>,
    x_scales: Array1<F>,
    y_mean: F,
    constant: Array1<bool>,
    with_intercept: bool,
}

impl<F: Float> Standardizer<F> {
    /// Compute centering offsets and scale factors
    ///
    /// With an intercept every column and the response are centered by their mean. With
    /// standardization every column is divided by its standard deviation around the offset
    /// (population normalisation), which is the root mean square of the column when no
    /// intercept is fitted. Columns whose spread is at the round-off level of their mean are
    /// treated as constant: they get a scale of one and are zeroed once centered.
    pub fn fit<D: Data<Elem = F>, S: Data<Elem = F>>(
        records: &ArrayBase<D, Ix2>,
        targets: &ArrayBase<S, Ix1>,
        standardize: bool,
        with_intercept: bool,
    ) -> Result<Self> {
        let (n_samples, n_features) = records.dim();
        if n_samples != targets.len() {
            return Err(AdmmError::ShapeMismatch {
                records: n_samples,
                targets: targets.len(),
            });
        }
        if n_samples == 0 {
            return Err(AdmmError::NotEnoughSamples);
        }
        if n_features == 0 {
            return Err(AdmmError::NoFeatures);
        }
        if records.iter().chain(targets.iter()).any(|v| !v.is_finite()) {
            return Err(AdmmError::NonFiniteInput);
        }

        let n = F::cast(n_samples);
        let (x_means, y_mean) = if with_intercept {
            (
                records.mean_axis(Axis(0)).ok_or(AdmmError::NotEnoughSamples)?,
                targets.sum() / n,
            )
        } else {
            (Array1::zeros(n_features), F::zero())
        };

        let mut x_scales = Array1::ones(n_features);
        let mut constant = Array1::from_elem(n_features, false);
        Zip::from(&mut x_scales)
            .and(&mut constant)
            .and(records.columns())
            .and(&x_means)
            .for_each(|scale, is_constant, col, &mean| {
                let var = col.iter().map(|&v| (v - mean) * (v - mean)).sum::<F>() / n;
                let sd = var.sqrt();
                // centering a constant column leaves only the round-off of its mean
                let tol = F::cast(16.) * F::epsilon() * mean.abs().max(F::one()) * n.sqrt();
                *is_constant = sd <= tol;
                if standardize && !*is_constant {
                    *scale = sd;
                }
            });

        Ok(Standardizer {
            x_means,
            x_scales,
            y_mean,
            constant,
            with_intercept,
        })
    }

    /// Fit the statistics and return them together with the standardized working copy
    pub fn standardize<D: Data<Elem = F>, S: Data<Elem = F>>(
        records: &ArrayBase<D, Ix2>,
        targets: &ArrayBase<S, Ix1>,
        standardize: bool,
        with_intercept: bool,
    ) -> Result<(Self, StandardizedData<F>)> {
        let standardizer = Self::fit(records, targets, standardize, with_intercept)?;
        let data = standardizer.transform(records, targets);

        Ok((standardizer, data))
    }

    /// Apply the forward transformation to a copy of the data
    pub fn transform<D: Data<Elem = F>, S: Data<Elem = F>>(
        &self,
        records: &ArrayBase<D, Ix2>,
        targets: &ArrayBase<S, Ix1>,
    ) -> StandardizedData<F> {
        let mut records = records.to_owned();
        Zip::from(records.columns_mut())
            .and(&self.x_means)
            .and(&self.x_scales)
            .and(&self.constant)
            .for_each(|mut col, &mean, &scale, &is_constant| {
                if is_constant && self.with_intercept {
                    col.fill(F::zero());
                } else {
                    col.mapv_inplace(|v| (v - mean) / scale);
                }
            });
        let targets = targets.mapv(|v| v - self.y_mean);

        StandardizedData { records, targets }
    }

    /// Map sparse coefficients of the standardized problem back to the original scale
    ///
    /// Returns the intercept, which is zero when no intercept is fitted, and the rescaled
    /// coefficients with the same sparsity pattern.
    pub fn recover(&self, coef: &CsVec<F>) -> (F, CsVec<F>) {
        let mut indices = Vec::with_capacity(coef.nnz());
        let mut data = Vec::with_capacity(coef.nnz());
        for (idx, &val) in coef.iter() {
            indices.push(idx);
            data.push(val / self.x_scales[idx]);
        }

        let intercept = if self.with_intercept {
            self.y_mean
                - indices
                    .iter()
                    .zip(data.iter())
                    .map(|(&idx, &val)| self.x_means[idx] * val)
                    .sum::<F>()
        } else {
            F::zero()
        };

        (intercept, CsVec::new(coef.dim(), indices, data))
    }

    pub fn x_means(&self) -> &Array1<F> {
        &self.x_means
    }

    pub fn x_scales(&self) -> &Array1<F> {
        &self.x_scales
    }

    pub fn y_mean(&self) -> F {
        self.y_mean
    }

    pub fn with_intercept(&self) -> bool {
        self.with_intercept
    }

    /// Features treated as constant
    pub fn constant_features(&self) -> &Array1<bool> {
        &self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn centers_and_scales_to_unit_variance() {
        let x = array![[1., 10.], [2., 20.], [3., 30.], [6., 60.]];
        let y = array![1., 2., 3., 6.];
        let (std, data) = Standardizer::standardize(&x, &y, true, true).unwrap();

        assert_abs_diff_eq!(*std.x_means(), array![3., 30.], epsilon = 1e-12);
        assert_abs_diff_eq!(std.y_mean(), 3., epsilon = 1e-12);

        let means = data.records.mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(means, array![0., 0.], epsilon = 1e-12);
        let vars = data.records.map_axis(Axis(0), |c| c.dot(&c) / 4.);
        assert_abs_diff_eq!(vars, array![1., 1.], epsilon = 1e-12);
        assert_abs_diff_eq!(data.targets, array![-2., -1., 0., 3.], epsilon = 1e-12);
    }

    #[test]
    fn identity_without_flags() {
        let x = array![[1., 2.], [3., 4.]];
        let y = array![1., -1.];
        let (std, data) = Standardizer::standardize(&x, &y, false, false).unwrap();

        assert_eq!(data.records, x);
        assert_eq!(data.targets, y);
        assert_eq!(std.x_scales(), &array![1., 1.]);

        let coef = CsVec::new(2, vec![1], vec![0.5]);
        let (intercept, recovered) = std.recover(&coef);
        assert_eq!(intercept, 0.);
        assert_eq!(recovered, coef);
    }

    #[test]
    fn scale_without_centering_uses_root_mean_square() {
        let x = array![[3.], [-3.], [3.], [-3.]];
        let y = array![0., 0., 0., 0.];
        let std = Standardizer::fit(&x, &y, true, false).unwrap();

        assert_abs_diff_eq!(std.x_scales()[0], 3., epsilon = 1e-12);
        assert_abs_diff_eq!(std.x_means()[0], 0., epsilon = 1e-12);
    }

    #[test]
    fn constant_column_is_not_scaled() {
        let x = array![[1., 5.], [2., 5.], [4., 5.]];
        let y = array![1., 2., 3.];
        let (std, data) = Standardizer::standardize(&x, &y, true, true).unwrap();

        assert_eq!(std.x_scales()[1], 1.);
        assert!(data.records.column(1).iter().all(|v: &f64| v.is_finite()));
        assert_abs_diff_eq!(data.records.column(1).sum(), 0., epsilon = 1e-12);
    }

    #[test]
    fn large_constant_column_is_detected() {
        let x = array![
            [0.3, 1234.567],
            [-1.2, 1234.567],
            [2.5, 1234.567],
            [0.8, 1234.567],
            [-0.4, 1234.567],
            [1.9, 1234.567],
            [-2.2, 1234.567]
        ];
        let y = array![1., 2., 3., 4., 5., 6., 7.];
        let (std, data) = Standardizer::standardize(&x, &y, true, true).unwrap();

        assert_eq!(std.x_scales()[1], 1.);
        assert_eq!(std.constant_features(), &array![false, true]);
        assert!(data.records.column(1).iter().all(|&v| v == 0.));
        assert!(std.x_scales()[0] > 1.);
    }

    #[test]
    fn tiny_spread_is_not_constant() {
        let x = array![[1e-6], [-1e-6], [2e-6], [-2e-6]];
        let y = array![1., 2., 3., 4.];
        let std = Standardizer::fit(&x, &y, true, true).unwrap();

        assert_eq!(std.constant_features(), &array![false]);
        assert!(std.x_scales()[0] < 1e-5);
    }

    #[test]
    fn recovered_coefficients_reproduce_predictions() {
        let x = array![[1., 0.5], [2., -1.], [3., 4.], [-2., 2.], [0., 1.]];
        let y = array![2., 1., 0., 3., -1.];
        let (std, data) = Standardizer::standardize(&x, &y, true, true).unwrap();

        let beta_std = array![0.7, -0.3];
        let expected = data.records.dot(&beta_std) + std.y_mean();

        let sparse = CsVec::new(2, vec![0, 1], beta_std.to_vec());
        let (intercept, beta) = std.recover(&sparse);
        let predicted = x.dot(&beta.to_dense()) + intercept;
        assert_abs_diff_eq!(predicted, expected, epsilon = 1e-10);
    }

    #[test]
    fn caller_data_is_untouched() {
        let x = array![[1., 2.], [3., 5.], [0., 1.]];
        let y = array![1., 2., 4.];
        let (x_before, y_before) = (x.clone(), y.clone());
        let _ = Standardizer::standardize(&x, &y, true, true).unwrap();

        assert_eq!(x, x_before);
        assert_eq!(y, y_before);
    }

    #[test]
    fn invalid_shapes() {
        let x = array![[1., 2.], [3., 5.]];
        let y = array![1.];
        assert!(matches!(
            Standardizer::fit(&x, &y, true, true),
            Err(AdmmError::ShapeMismatch {
                records: 2,
                targets: 1
            })
        ));

        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        assert!(matches!(
            Standardizer::fit(&x, &y, true, true),
            Err(AdmmError::NotEnoughSamples)
        ));

        let x = Array2::<f64>::zeros((3, 0));
        let y = Array1::<f64>::zeros(3);
        assert!(matches!(
            Standardizer::fit(&x, &y, true, true),
            Err(AdmmError::NoFeatures)
        ));

        let x = array![[1., f64::NAN]];
        let y = array![1.];
        assert!(matches!(
            Standardizer::fit(&x, &y, true, true),
            Err(AdmmError::NonFiniteInput)
        ));
    }
}
