//! linfa-admm prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{AdmmError, Result};

#[doc(no_inline)]
pub use crate::traits::*;

#[doc(no_inline)]
pub use crate::param_guard::ParamGuard;

#[doc(no_inline)]
pub use crate::hyperparams::{
    AdmmParams, AdmmValidParams, LambdaSequence, PathStrategy, RhoAdaptation,
};

#[doc(no_inline)]
pub use crate::path::{ElasticNetPath, PathModel, PathStep};

#[doc(no_inline)]
pub use crate::Float;
