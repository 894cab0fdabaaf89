//! Error types in linfa-admm
//!
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdmmError>;

/// Everything that can go wrong while computing an elastic-net path
///
/// Reaching the iteration limit for a penalty is not an error, it is reported through
/// [`ElasticNetPath::n_iterations`](crate::ElasticNetPath::n_iterations) and
/// [`ElasticNetPath::converged`](crate::ElasticNetPath::converged) instead.
#[derive(Error, Debug)]
pub enum AdmmError {
    /// The mixing parameter is not in the unit range
    #[error("l1 ratio should be in range [0, 1], is {0}")]
    InvalidL1Ratio(f32),
    /// No penalty should be generated
    #[error("number of penalties should be at least one, is {0}")]
    InvalidNLambda(usize),
    #[error("ratio of smallest to largest penalty should be in range (0, 1), is {0}")]
    InvalidLambdaMinRatio(f32),
    /// A user supplied penalty is zero, negative or not finite
    #[error("penalty should be strictly positive and finite, is {0}")]
    InvalidLambda(f32),
    /// The centered response has no correlation with any feature
    #[error("largest penalty is zero, the response is uncorrelated with every feature")]
    ZeroLambdaMax,
    #[error("an explicit penalty sequence has to contain at least one value")]
    EmptyLambdaSequence,
    #[error("maximal number of iterations should be positive, is {0}")]
    InvalidMaxIterations(usize),
    #[error("tolerance should be strictly positive, is {0}")]
    InvalidTolerance(f32),
    #[error("ratio between augmentation and penalty should be strictly positive, is {0}")]
    InvalidRhoRatio(f32),
    #[error("adaptive augmentation needs a balance factor and a step larger than one")]
    InvalidRhoAdaptation,
    #[error("zero threshold should be non-negative, is {0}")]
    InvalidZeroThreshold(f32),
    #[error("number of records ({records}) does not match number of targets ({targets})")]
    ShapeMismatch { records: usize, targets: usize },
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("the design matrix has no features")]
    NoFeatures,
    #[error("records or targets contain values which are not finite")]
    NonFiniteInput,
    /// Iterates diverged, continuing would poison every following warm start
    #[error("non-finite iterate for penalty {lambda} at iteration {iteration}")]
    NonFinite { lambda: f32, iteration: usize },
    #[error(transparent)]
    Linalg(#[from] linfa_linalg::LinalgError),
}
