//! Provide traits for the different phases of estimation
//!
use std::error::Error;

use crate::param_guard::ParamGuard;

/// Fittable algorithms
///
/// A fittable algorithm takes a design matrix and a response and creates a concrete model.
/// The hyperparameters are passed in by `&self`, the data is borrowed and never modified.
pub trait Fit<R, T, E: Error> {
    type Object;

    fn fit(&self, records: &R, targets: &T) -> Result<Self::Object, E>;
}

/// Predict with model into a mutable reference of targets.
pub trait PredictInplace<R, T> {
    /// Predict something in place
    fn predict_inplace(&self, x: &R, y: &mut T);

    /// Create targets that `predict_inplace` works with.
    fn default_target(&self, x: &R) -> T;
}

/// Predict with model
///
/// Implemented for every model which predicts in place.
pub trait Predict<R, T> {
    fn predict(&self, x: &R) -> T;
}

impl<R, T, M: PredictInplace<R, T>> Predict<R, T> for M {
    fn predict(&self, x: &R) -> T {
        let mut y = self.default_target(x);
        self.predict_inplace(x, &mut y);
        y
    }
}

/// Performs checking step and calls `fit` on the checked hyperparameters. If checking failed, the
/// checking error is converted to the original error type of `Fit` and returned.
impl<R, T, E, P: ParamGuard> Fit<R, T, E> for P
where
    P::Checked: Fit<R, T, E>,
    E: Error + From<P::Error>,
{
    type Object = <<P as ParamGuard>::Checked as Fit<R, T, E>>::Object;

    fn fit(&self, records: &R, targets: &T) -> Result<Self::Object, E> {
        let checked = self.check_ref()?;
        checked.fit(records, targets)
    }
}
