/*!

The `credentials` module provisions the operator's own AWS credentials. A `CredentialsRequest`
carrying the operator's IAM policy is submitted to the cloud credential operator, which issues
credentials into a secret in the operator namespace. The secret's `credentials` value, an AWS
shared credentials file, is then copied to a local file for the AWS SDK to read.

!*/

use crate::constants::{CREDENTIALS_FILE_PREFIX, SECRET_WAIT_POLICY};
use crate::error::{self, Result};
use crate::wait::{wait_until, WaitPolicy};
use albo_model::constants::{
    CLOUD_CREDENTIAL_NAMESPACE, CREDENTIALS_KEY, CREDENTIALS_REQUEST_NAME,
    CREDENTIALS_SECRET_NAME, ENV_ROLE_ARN, OPERATOR_SERVICE_ACCOUNT, WEB_IDENTITY_TOKEN_PATH,
};
use albo_model::{
    iam_policy, Arn, AwsProviderSpec, CredentialsRequest, CredentialsRequestSpec, HttpStatusCode,
    ObjectKey, ObjectStore, SecretReference, StoreError,
};
use k8s_openapi::api::core::v1::Secret;
use log::{info, warn};
use snafu::{OptionExt, ResultExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Everything `provision_credentials_with` needs to know.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProvisionOptions {
    /// The operator namespace, which receives the credentials secret.
    pub secret_namespace: String,
    pub secret_name: String,
    /// The IAM role to assume through STS, or empty for long-lived credentials.
    pub role_arn: String,
    pub secret_wait: WaitPolicy,
    /// Where the credentials file is created.
    pub credentials_dir: PathBuf,
}

impl ProvisionOptions {
    /// Default options for `secret_namespace`, with the role ARN taken from `ROLEARN`.
    pub fn new<S>(secret_namespace: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            secret_namespace: secret_namespace.into(),
            secret_name: CREDENTIALS_SECRET_NAME.to_string(),
            role_arn: role_arn_from_env(),
            secret_wait: SECRET_WAIT_POLICY,
            credentials_dir: std::env::temp_dir(),
        }
    }

    pub fn secret_key(&self) -> ObjectKey {
        ObjectKey::namespaced(&self.secret_namespace, &self.secret_name)
    }
}

/// The value of `ROLEARN`, or an empty string if it is not set.
pub fn role_arn_from_env() -> String {
    std::env::var(ENV_ROLE_ARN).unwrap_or_default()
}

/// Build the `CredentialsRequest` for the operator's IAM policy. The issued secret will be named
/// `secret_name` in `secret_namespace`. If `role_arn` is not empty it must be a valid ARN, and the
/// request asks for short-term credentials for that role using the projected service account
/// token.
pub fn build_credentials_request(
    secret_namespace: &str,
    secret_name: &str,
    role_arn: &str,
) -> Result<CredentialsRequest> {
    let role_arn = if role_arn.is_empty() {
        None
    } else {
        Some(
            role_arn
                .parse::<Arn>()
                .context(error::InvalidRoleArnSnafu { value: role_arn })?,
        )
    };
    let provider_spec = AwsProviderSpec {
        statement_entries: iam_policy().statement_entries(),
        sts_iam_role_arn: role_arn.as_ref().map(Arn::to_string),
    }
    .encode()
    .context(error::EncodeProviderSpecSnafu {
        key: ObjectKey::namespaced(CLOUD_CREDENTIAL_NAMESPACE, CREDENTIALS_REQUEST_NAME),
    })?;

    let mut request = CredentialsRequest::new(
        CREDENTIALS_REQUEST_NAME,
        CredentialsRequestSpec {
            secret_ref: SecretReference {
                namespace: secret_namespace.to_string(),
                name: secret_name.to_string(),
            },
            provider_spec: Some(provider_spec),
            service_account_names: vec![OPERATOR_SERVICE_ACCOUNT.to_string()],
            cloud_token_path: match role_arn {
                Some(_) => WEB_IDENTITY_TOKEN_PATH.to_string(),
                None => String::new(),
            },
        },
    );
    request.metadata.namespace = Some(CLOUD_CREDENTIAL_NAMESPACE.to_string());
    Ok(request)
}

/// Provision credentials into `namespace` with default options and return the path of the
/// credentials file.
pub async fn provision_credentials<S>(
    store: &S,
    namespace: &str,
    cancel: &CancellationToken,
) -> Result<PathBuf>
where
    S: ObjectStore,
{
    provision_credentials_with(store, &ProvisionOptions::new(namespace), cancel).await
}

/// Submit the operator's `CredentialsRequest`, wait for the issued secret and copy its
/// credentials into a new file whose path is returned. A request that already exists is left as
/// it is. Nothing is written to the cluster if the role ARN is invalid, and no file is created
/// unless a usable secret was found.
pub async fn provision_credentials_with<S>(
    store: &S,
    options: &ProvisionOptions,
    cancel: &CancellationToken,
) -> Result<PathBuf>
where
    S: ObjectStore,
{
    let request = build_credentials_request(
        &options.secret_namespace,
        &options.secret_name,
        &options.role_arn,
    )?;
    let request_key = ObjectKey::of(&request);

    match store.create(&request).await {
        Ok(_) => info!("Created credentials request '{}'", request_key),
        Err(e) if e.is_already_exists() => warn!(
            "Credentials request '{}' already exists, it will not be updated",
            request_key
        ),
        Err(e) => Err(e).context(error::CreateCredentialsRequestSnafu)?,
    }

    let secret_key = options.secret_key();
    info!("Waiting for credentials secret '{}'", secret_key);
    let secret = wait_for_secret(store, &secret_key, options.secret_wait, cancel).await?;

    let path = credentials_file_from_secret(
        &secret,
        &options.credentials_dir,
        CREDENTIALS_FILE_PREFIX,
    )?;
    info!(
        "Wrote credentials from secret '{}' to '{}'",
        secret_key,
        path.display()
    );
    Ok(path)
}

/// Wait until the secret `key` exists. Only "not found" is waited out; any other error ends the
/// wait.
pub async fn wait_for_secret<S>(
    store: &S,
    key: &ObjectKey,
    policy: WaitPolicy,
    cancel: &CancellationToken,
) -> Result<Secret>
where
    S: ObjectStore,
{
    Ok(wait_until(
        &format!("secret '{}'", key),
        policy,
        cancel,
        |e: &StoreError| e.is_not_found(),
        || store.get::<Secret>(key),
    )
    .await
    .context(error::WaitForSecretSnafu { key: key.clone() })?)
}

/// Write the `credentials` value of `secret` verbatim to a new file in `directory` whose name
/// starts with `prefix`. The file is kept when the process exits.
pub fn credentials_file_from_secret(
    secret: &Secret,
    directory: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let credentials = secret
        .data
        .as_ref()
        .and_then(|data| data.get(CREDENTIALS_KEY))
        .map(|value| value.0.as_slice())
        .filter(|value| !value.is_empty())
        .context(error::MissingCredentialsSnafu {
            key: ObjectKey::of(secret),
            data_key: CREDENTIALS_KEY,
        })?;

    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(directory)
        .context(error::CreateCredentialsFileSnafu { directory })?;
    file.write_all(credentials)
        .and_then(|_| file.flush())
        .context(error::WriteCredentialsFileSnafu { path: file.path() })?;
    let path = file.path().to_path_buf();
    Ok(file
        .into_temp_path()
        .keep()
        .context(error::PersistCredentialsFileSnafu { path })?)
}
