use crate::constants::{AWS_PROVIDER_SPEC_KIND, CLOUD_CREDENTIAL_API_VERSION};
use crate::error::{self, Result};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ensure, OptionExt, ResultExt};
use std::collections::BTreeMap;

/// A request for cloud credentials submitted to the cloud credential operator. The operator
/// watches these objects and materializes the issued credentials into the secret named by
/// `secret_ref`. The `CustomResource` derive also produces a struct named `CredentialsRequest`
/// which represents the object in the k8s API.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "cloudcredential.openshift.io",
    kind = "CredentialsRequest",
    namespaced,
    plural = "credentialsrequests",
    singular = "credentialsrequest",
    version = "v1"
)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequestSpec {
    /// Where the issued credentials should be stored.
    pub secret_ref: SecretReference,
    /// The encoded, provider specific part of the request. For AWS this is an `AwsProviderSpec`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_spec: Option<Value>,
    /// Service accounts that will use the credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_account_names: Vec<String>,
    /// Path of the projected service account token used for short-term credentials. Empty unless
    /// an STS role is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloud_token_path: String,
}

/// The namespace and name of the secret that receives the issued credentials.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct SecretReference {
    pub namespace: String,
    pub name: String,
}

impl CredentialsRequest {
    /// Decodes the AWS provider spec embedded in this request.
    pub fn aws_provider_spec(&self) -> Result<AwsProviderSpec> {
        let raw = self
            .spec
            .provider_spec
            .as_ref()
            .context(error::ProviderSpecMissingSnafu {
                name: self.name_any(),
            })?;
        AwsProviderSpec::decode(raw)
    }
}

/// The AWS part of a credentials request: the IAM policy statements to grant and, optionally, the
/// IAM role to assume through STS with a web identity token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsProviderSpec {
    pub statement_entries: Vec<StatementEntry>,
    #[serde(
        rename = "stsIAMRoleARN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sts_iam_role_arn: Option<String>,
}

/// A single IAM policy statement in the shape the cloud credential operator expects.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntry {
    pub effect: String,
    pub action: Vec<String>,
    pub resource: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policy_condition: BTreeMap<String, BTreeMap<String, Value>>,
}

/// The wire form of an `AwsProviderSpec`, which carries its own type information.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypedProviderSpec {
    api_version: String,
    kind: String,
    #[serde(flatten)]
    spec: AwsProviderSpec,
}

impl AwsProviderSpec {
    /// Encode into the raw object stored in `CredentialsRequestSpec::provider_spec`.
    pub fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(TypedProviderSpec {
            api_version: CLOUD_CREDENTIAL_API_VERSION.to_string(),
            kind: AWS_PROVIDER_SPEC_KIND.to_string(),
            spec: self.clone(),
        })
        .context(error::ProviderSpecEncodeSnafu)?)
    }

    /// Decode from the raw object stored in `CredentialsRequestSpec::provider_spec`.
    pub fn decode(raw: &Value) -> Result<Self> {
        let typed: TypedProviderSpec =
            serde_json::from_value(raw.clone()).context(error::ProviderSpecDecodeSnafu)?;
        ensure!(
            typed.kind == AWS_PROVIDER_SPEC_KIND,
            error::ProviderSpecKindSnafu {
                expected: AWS_PROVIDER_SPEC_KIND,
                found: typed.kind,
            }
        );
        Ok(typed.spec)
    }
}
