//! Errors raised while turning raw event records into a mass dataset.
use crate::spectrum::errors::FitError;

/// Unified error type for preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessError {
    // ---- Execution ----
    /// The worker pool could not be created.
    ThreadPool { text: String },

    // ---- Records ----
    /// A record is internally inconsistent (e.g. fewer photon kinematics
    /// than its photon count claims, or non-finite kinematics).
    MalformedRecord { index: usize, reason: &'static str },

    // ---- Dataset ----
    /// Building the dataset from selected events failed.
    Dataset(FitError),
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;

impl std::error::Error for PreprocessError {}

impl From<FitError> for PreprocessError {
    fn from(err: FitError) -> Self {
        PreprocessError::Dataset(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for PreprocessError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PreprocessError::ThreadPool { text: err.to_string() }
    }
}

impl std::fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessError::ThreadPool { text } => {
                write!(f, "Preprocess Error: failed to create thread pool: {text}")
            }
            PreprocessError::MalformedRecord { index, reason } => {
                write!(f, "Preprocess Error: record {index} is malformed: {reason}")
            }
            PreprocessError::Dataset(err) => write!(f, "Preprocess Error: {err}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PreprocessError> for pyo3::PyErr {
    fn from(err: PreprocessError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
