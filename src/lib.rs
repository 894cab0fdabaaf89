//! # Elastic-net regularization paths
//!
//! `linfa-admm` computes the coefficients of elastic-net penalized linear regression for a
//! whole sequence of penalties. Every penalty is solved with the Alternating Direction Method
//! of Multipliers (ADMM), consecutive penalties are warm started from the previous solution.
//!
//! ## The Big Picture
//!
//! `linfa-admm` is a crate in the [`linfa`](https://crates.io/crates/linfa) ecosystem, an effort
//! to create a toolkit for classical Machine Learning implemented in pure Rust, akin to Python's
//! `scikit-learn`.
//!
//! ## Current state
//!
//! For every penalty `lambda` of the path the objective
//! ```ignore
//! 1 / (2 * n_samples) * ||y - Xw - b||^2_2
//!     + lambda * (l1_ratio * ||w||_1 + 0.5 * (1 - l1_ratio) * ||w||^2_2)
//! ```
//! is minimized. The computation runs through the following stages
//!
//! * [`Standardizer`] centers and scales a working copy of the data,
//! * [`lambda`] derives the largest useful penalty and a log-spaced grid below it,
//! * [`AdmmSolver`] iterates a single penalty on a shared [`AdmmProblem`], the Gram matrix is
//!   factorized once by [`GramFactor`],
//! * [`ElasticNetPath`] collects the solutions on the original scale in a sparse matrix.
//!
//! ## Example
//!
//! ```rust
//! use linfa_admm::{AdmmError, AdmmParams};
//! use linfa_admm::traits::Fit;
//! use ndarray::array;
//!
//! let x = array![[1.0, 0.2], [0.5, 1.0], [1.5, -0.3], [-1.0, 0.4], [0.2, -1.2]];
//! let y = array![2.1, 1.4, 2.8, -1.7, 0.9];
//!
//! let path = AdmmParams::new().l1_ratio(0.9).n_lambda(25).fit(&x, &y)?;
//!
//! // the largest penalty removes every feature
//! let (_, coef) = path.coefficients(0);
//! assert!(coef.iter().all(|&c| c == 0.0));
//! assert_eq!(path.coef_path().shape(), (3, 25));
//! # Ok::<(), AdmmError>(())
//! ```

pub mod benchmarks;
pub mod error;
pub mod factor;
mod float;
mod hyperparams;
pub mod lambda;
mod param_guard;
mod path;
pub mod path_matrix;
pub mod prelude;
pub mod solver;
pub mod standardize;
pub mod traits;

pub use error::{AdmmError, Result};
pub use factor::{GramFactor, GramForm};
pub use float::Float;
pub use hyperparams::{AdmmParams, AdmmValidParams, LambdaSequence, PathStrategy, RhoAdaptation};
pub use param_guard::ParamGuard;
pub use path::{ElasticNetPath, PathModel, PathStep};
pub use solver::{AdmmProblem, AdmmSolver, AdmmState, SolverOptions, SolverStatus};
pub use standardize::{StandardizedData, Standardizer};
