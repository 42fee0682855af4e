/*!

This library provides the Kubernetes object types that the AWS load balancer operator reads and
writes while bootstrapping, along with a small object store abstraction over the Kubernetes API.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use arn::Arn;
pub use clients::{
    HttpStatusCode, KubeStore, ObjectKey, ObjectStore, StoreError, StoreObject, StoreResult,
};
pub use credentials_request::{
    AwsProviderSpec, CredentialsRequest, CredentialsRequestSpec, SecretReference, StatementEntry,
};
pub use error::{Error, Result};
pub use iam_policy::{iam_policy, PolicyDocument, PolicyStatement};
pub use infrastructure::{
    AwsPlatformStatus, Infrastructure, InfrastructureSpec, InfrastructureStatus, PlatformSpec,
    PlatformStatus,
};

mod arn;
pub mod clients;
pub mod constants;
mod credentials_request;
mod error;
mod iam_policy;
mod infrastructure;
