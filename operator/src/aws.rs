/*!

The `aws` module builds the EC2 client used by the operator from the issued credentials file and
provides the VPC lookup needed to discover where the cluster runs.

!*/

use crate::error::{self, Result};
use albo_model::constants::cluster_ownership_tag;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::provider_config::ProviderConfig;
use aws_config::retry::RetryConfig;
use aws_sdk_ec2::error::DescribeVpcsError;
use aws_sdk_ec2::model::Filter;
use aws_sdk_ec2::types::SdkError;
use aws_smithy_types::retry::RetryMode;
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::{debug, info};
use snafu::{OptionExt, ResultExt, Snafu};
use std::path::Path;

/// Retries performed by the SDK itself for a single call. The callers wrap lookups in their own
/// bounded wait, so this is kept small.
const SDK_MAX_ATTEMPTS: u32 = 3;

/// The EC2 filter that matches on the presence of a tag key.
const TAG_KEY_FILTER: &str = "tag-key";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LookupError {
    #[snafu(display("Unable to describe VPCs tagged '{}': {}", tag, source))]
    DescribeVpcs {
        tag: String,
        source: SdkError<DescribeVpcsError>,
    },

    #[snafu(display("No VPC tagged '{}' found", tag))]
    NoVpc { tag: String },

    #[snafu(display("Found {} VPCs tagged '{}': {:?}", vpc_ids.len(), tag, vpc_ids))]
    MultipleVpcs { tag: String, vpc_ids: Vec<String> },

    #[snafu(display("VPC tagged '{}' has no id", tag))]
    MissingVpcId { tag: String },
}

/// Finds the VPC a cluster runs in.
#[async_trait::async_trait]
pub trait VpcLookup: Send + Sync {
    /// Returns the id of the single VPC tagged as owned by `cluster_name`.
    async fn vpc_id(&self, cluster_name: &str) -> std::result::Result<String, LookupError>;
}

/// Builds a `VpcLookup` from a region and a shared credentials file.
#[async_trait::async_trait]
pub trait AwsClientFactory: Send + Sync {
    type Client: VpcLookup;

    async fn new_client(&self, region: &str, credentials_file: &Path) -> Result<Self::Client>;
}

/// An EC2 API client.
#[derive(Clone, Debug)]
pub struct Ec2Client {
    client: aws_sdk_ec2::Client,
}

impl Ec2Client {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client, for calls beyond bootstrap.
    pub fn sdk_client(&self) -> &aws_sdk_ec2::Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl VpcLookup for Ec2Client {
    async fn vpc_id(&self, cluster_name: &str) -> std::result::Result<String, LookupError> {
        let tag = cluster_ownership_tag(cluster_name);
        let output = self
            .client
            .describe_vpcs()
            .filters(Filter::builder().name(TAG_KEY_FILTER).values(&tag).build())
            .send()
            .await
            .context(DescribeVpcsSnafu { tag: &tag })?;
        match output.vpcs().unwrap_or_default() {
            [] => NoVpcSnafu { tag }.fail(),
            [vpc] => vpc
                .vpc_id()
                .map(str::to_string)
                .context(MissingVpcIdSnafu { tag }),
            vpcs => MultipleVpcsSnafu {
                tag,
                vpc_ids: vpcs
                    .iter()
                    .filter_map(|vpc| vpc.vpc_id())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            }
            .fail(),
        }
    }
}

/// Creates `Ec2Client`s backed by the AWS SDK.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ec2ClientFactory;

#[async_trait::async_trait]
impl AwsClientFactory for Ec2ClientFactory {
    type Client = Ec2Client;

    async fn new_client(&self, region: &str, credentials_file: &Path) -> Result<Self::Client> {
        new_aws_client(region, credentials_file).await
    }
}

/// Create an EC2 client for `region` that reads its credentials from the shared credentials file
/// at `credentials_file`.
pub async fn new_aws_client(region: &str, credentials_file: &Path) -> Result<Ec2Client> {
    std::fs::metadata(credentials_file).context(error::ReadCredentialsFileSnafu {
        path: credentials_file,
    })?;
    let config = aws_config(region, credentials_file).await;
    Ok(Ec2Client::new(aws_sdk_ec2::Client::new(&config)))
}

/// Set up the config for AWS calls in `region` using the `default` profile of the shared
/// credentials file at `credentials_file`. The user's own AWS config and credentials files are
/// not consulted.
pub async fn aws_config(region: &str, credentials_file: &Path) -> SdkConfig {
    info!(
        "Creating AWS config for region '{}' with credentials from '{}'",
        region,
        credentials_file.display()
    );
    let region = Region::new(region.to_string());
    let profile_files = ProfileFiles::builder()
        .with_file(ProfileFileKind::Credentials, credentials_file)
        .build();
    // A web identity profile assumes its role through STS, which needs the region too.
    let credentials_provider = ProfileFileCredentialsProvider::builder()
        .configure(&ProviderConfig::without_region().with_region(Some(region.clone())))
        .profile_files(profile_files)
        .build();
    debug!("Using at most {} SDK attempts per call", SDK_MAX_ATTEMPTS);
    aws_config::from_env()
        .region(region)
        .credentials_provider(credentials_provider)
        .retry_config(
            RetryConfig::standard()
                .with_retry_mode(RetryMode::Adaptive)
                .with_max_attempts(SDK_MAX_ATTEMPTS),
        )
        .load()
        .await
}
