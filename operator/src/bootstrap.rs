/*!

The `bootstrap` module runs the discovery and provisioning steps in order. Each step needs the
result of the previous one, so they are never run concurrently:

1. read the cluster name and AWS region,
2. provision AWS credentials into a local file,
3. build an AWS client from the region and the credentials file,
4. wait for the cluster VPC id.

!*/

use crate::aws::AwsClientFactory;
use crate::cluster::{get_cluster_info, resolve_vpc_id};
use crate::constants::AWS_REQUEST_WAIT_POLICY;
use crate::credentials::{provision_credentials_with, ProvisionOptions};
use crate::error::Result;
use crate::impl_display_as_json;
use crate::wait::WaitPolicy;
use albo_model::ObjectStore;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// The startup configuration handed to the load balancer controller reconciler.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    /// Path of the AWS shared credentials file.
    pub credentials_file: PathBuf,
    pub aws_region: String,
    pub cluster_name: String,
    pub vpc_id: String,
}

impl_display_as_json!(BootstrapConfig);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BootstrapOptions {
    pub provision: ProvisionOptions,
    pub vpc_wait: WaitPolicy,
}

impl BootstrapOptions {
    /// Default options for an operator running in `namespace`.
    pub fn new<S>(namespace: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            provision: ProvisionOptions::new(namespace),
            vpc_wait: AWS_REQUEST_WAIT_POLICY,
        }
    }
}

/// The outcome of a successful bootstrap: the configuration and the AWS client built from it.
pub struct Bootstrapped<C> {
    pub config: BootstrapConfig,
    pub client: C,
}

pub async fn bootstrap<S, F>(
    store: &S,
    aws: &F,
    options: &BootstrapOptions,
    cancel: &CancellationToken,
) -> Result<Bootstrapped<F::Client>>
where
    S: ObjectStore,
    F: AwsClientFactory,
{
    let cluster = get_cluster_info(store).await?;

    info!("Provisioning credentials");
    let credentials_file = provision_credentials_with(store, &options.provision, cancel).await?;

    let client = aws
        .new_client(&cluster.aws_region, &credentials_file)
        .await?;

    let vpc_id = resolve_vpc_id(&client, &cluster.cluster_name, options.vpc_wait, cancel).await?;

    Ok(Bootstrapped {
        config: BootstrapConfig {
            credentials_file,
            aws_region: cluster.aws_region,
            cluster_name: cluster.cluster_name,
            vpc_id,
        },
        client,
    })
}
