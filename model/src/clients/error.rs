use super::{HttpStatusCode, ObjectKey, StatusCode};
use snafu::Snafu;
use std::path::PathBuf;

/// The `Result` type returned by `clients`.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The error type returned by an `ObjectStore`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Error initializing the Kubernetes client: {}", source))]
    Initialization { source: kube::Error },

    #[snafu(display("Unable to load kubeconfig '{}': {}", path.display(), source))]
    Kubeconfig {
        path: PathBuf,
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to {} {} '{}': {}", method, kind, key, source))]
    KubeApiCall {
        /// What we were trying to do, e.g. 'get'.
        method: String,
        /// The kind of the object, e.g. 'Secret'.
        kind: String,
        /// The namespace and name of the object.
        key: ObjectKey,
        /// The error from kube-rs.
        source: kube::Error,
    },
}

impl HttpStatusCode for StoreError {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            StoreError::Initialization { .. } | StoreError::Kubeconfig { .. } => None,
            StoreError::KubeApiCall { source, .. } => source.status_code(),
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            StoreError::Initialization { .. } | StoreError::Kubeconfig { .. } => None,
            StoreError::KubeApiCall { source, .. } => source.reason(),
        }
    }
}
