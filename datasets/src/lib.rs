//! `linfa-admm-datasets` provides synthetic regression problems ready to be used in tests and
//! benchmarks of `linfa-admm`.
//!
//! ## The Big Picture
//!
//! `linfa-admm-datasets` is a crate in the [`linfa`](https://crates.io/crates/linfa) ecosystem,
//! an effort to create a toolkit for classical Machine Learning implemented in pure Rust, akin to
//! Python's `scikit-learn`.
//!
//! ## Current State
//!
//! Currently the following generators are provided in [`generate`]:
//!
//! * `make_regression` : Gaussian design with a sparse linear response
//! * `make_correlated_regression` : equicorrelated design with a sparse linear response
//! * `orthonormal_design` : design matrix with orthonormal columns
//!
//! All generators take the random number generator by mutable reference, seeding it makes the
//! problems reproducible.

pub mod generate;

pub use generate::Regression;
