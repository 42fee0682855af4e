use crate::aws::LookupError;
use crate::wait::WaitError;
use albo_model::{HttpStatusCode, ObjectKey, StoreError};
use snafu::Snafu;
use std::path::PathBuf;

/// The `Result` type returned by the bootstrap.
pub type Result<T> = std::result::Result<T, Error>;

/// The public error type returned by the bootstrap.
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

/// The broad class of a bootstrap failure. None of them are retried by the bootstrap itself; the
/// process is expected to exit and be restarted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Configuration such as the role ARN is malformed.
    InvalidInput,
    /// A required cluster object does not exist.
    NotFound,
    /// A required cluster object exists but is not fully populated.
    IncompleteStatus,
    /// A bounded wait ran out of time or was cancelled.
    Timeout,
    /// The issued credentials secret is unusable.
    MalformedSecret,
    /// A local file could not be created, written or read.
    IoFailure,
    /// A cluster or AWS API call failed for any other reason.
    Api,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

/// The private error type returned by the bootstrap.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum InnerError {
    #[snafu(display("Provided role ARN '{}' is invalid: {}", value, source))]
    InvalidRoleArn {
        value: String,
        source: albo_model::Error,
    },

    #[snafu(display("Unable to build credentials request '{}': {}", key, source))]
    EncodeProviderSpec {
        key: ObjectKey,
        source: albo_model::Error,
    },

    #[snafu(display("Unable to create credentials request: {}", source))]
    CreateCredentialsRequest { source: StoreError },

    #[snafu(display("Waiting for operator credentials secret '{}': {}", key, source))]
    WaitForSecret {
        key: ObjectKey,
        source: WaitError<StoreError>,
    },

    #[snafu(display("Secret '{}' has no data under key '{}'", key, data_key))]
    MissingCredentials { key: ObjectKey, data_key: String },

    #[snafu(display(
        "Unable to create credentials file in '{}': {}",
        directory.display(),
        source
    ))]
    CreateCredentialsFile {
        directory: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to write credentials to '{}': {}", path.display(), source))]
    WriteCredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to keep credentials file '{}': {}", path.display(), source))]
    PersistCredentialsFile {
        path: PathBuf,
        source: tempfile::PathPersistError,
    },

    #[snafu(display("Unable to read credentials file '{}': {}", path.display(), source))]
    ReadCredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to get Infrastructure '{}': {}", name, source))]
    GetInfrastructure { name: String, source: StoreError },

    #[snafu(display(
        "Infrastructure '{}' status has no infrastructure name, is the cluster initialized?",
        name
    ))]
    MissingInfrastructureName { name: String },

    #[snafu(display(
        "Infrastructure '{}' status has no AWS region, is this an AWS cluster?",
        name
    ))]
    MissingAwsRegion { name: String },

    #[snafu(display("Unable to get VPC id of cluster '{}': {}", cluster_name, source))]
    WaitForVpc {
        cluster_name: String,
        source: WaitError<LookupError>,
    },
}

impl InnerError {
    fn kind(&self) -> ErrorKind {
        match self {
            InnerError::InvalidRoleArn { .. } | InnerError::EncodeProviderSpec { .. } => {
                ErrorKind::InvalidInput
            }
            InnerError::CreateCredentialsRequest { .. } => ErrorKind::Api,
            InnerError::WaitForSecret { source, .. } => wait_error_kind(source),
            InnerError::WaitForVpc { source, .. } => wait_error_kind(source),
            InnerError::MissingCredentials { .. } => ErrorKind::MalformedSecret,
            InnerError::CreateCredentialsFile { .. }
            | InnerError::WriteCredentialsFile { .. }
            | InnerError::PersistCredentialsFile { .. }
            | InnerError::ReadCredentialsFile { .. } => ErrorKind::IoFailure,
            InnerError::GetInfrastructure { source, .. } if source.is_not_found() => {
                ErrorKind::NotFound
            }
            InnerError::GetInfrastructure { .. } => ErrorKind::Api,
            InnerError::MissingInfrastructureName { .. } | InnerError::MissingAwsRegion { .. } => {
                ErrorKind::IncompleteStatus
            }
        }
    }
}

fn wait_error_kind<E>(e: &WaitError<E>) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Api
    }
}
