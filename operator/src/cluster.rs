/*!

The `cluster` module discovers the facts about the cluster that every AWS call depends on: the
cluster name and AWS region from the `Infrastructure` object, and the id of the VPC the cluster
runs in.

!*/

use crate::aws::VpcLookup;
use crate::error::{self, Result};
use crate::wait::{wait_until, WaitPolicy};
use albo_model::constants::CLUSTER_INFRASTRUCTURE_NAME;
use albo_model::{Infrastructure, ObjectKey, ObjectStore};
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use tokio_util::sync::CancellationToken;

/// The identity and placement of the cluster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub cluster_name: String,
    pub aws_region: String,
}

/// Read the cluster name and AWS region from the cluster's `Infrastructure` object. A missing or
/// half populated object is an error, it is not waited for.
pub async fn get_cluster_info<S>(store: &S) -> Result<ClusterInfo>
where
    S: ObjectStore,
{
    let name = CLUSTER_INFRASTRUCTURE_NAME;
    let infra = store
        .get::<Infrastructure>(&ObjectKey::cluster(name))
        .await
        .context(error::GetInfrastructureSnafu { name })?;
    let cluster_name = infra
        .infrastructure_name()
        .context(error::MissingInfrastructureNameSnafu { name })?;
    let aws_region = infra
        .aws_region()
        .context(error::MissingAwsRegionSnafu { name })?;
    info!(
        "Cluster '{}' runs in AWS region '{}'",
        cluster_name, aws_region
    );
    Ok(ClusterInfo {
        cluster_name: cluster_name.to_string(),
        aws_region: aws_region.to_string(),
    })
}

/// Look up the VPC id of `cluster_name`, retrying every lookup failure until `policy.timeout`
/// elapses.
pub async fn resolve_vpc_id<L>(
    client: &L,
    cluster_name: &str,
    policy: WaitPolicy,
    cancel: &CancellationToken,
) -> Result<String>
where
    L: VpcLookup,
{
    let vpc_id = wait_until(
        &format!("VPC of cluster '{}'", cluster_name),
        policy,
        cancel,
        |_| true,
        || client.vpc_id(cluster_name),
    )
    .await
    .context(error::WaitForVpcSnafu { cluster_name })?;
    info!("Cluster '{}' runs in VPC '{}'", cluster_name, vpc_id);
    Ok(vpc_id)
}
