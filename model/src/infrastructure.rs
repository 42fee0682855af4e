use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The cluster-wide infrastructure configuration. A single object of this kind, named `cluster`,
/// describes the platform the cluster runs on. Only the fields needed to discover the AWS
/// placement of the cluster are modelled.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "config.openshift.io",
    kind = "Infrastructure",
    plural = "infrastructures",
    singular = "infrastructure",
    status = "InfrastructureStatus",
    version = "v1"
)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_spec: Option<PlatformSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct PlatformSpec {
    #[serde(rename = "type", default)]
    pub platform_type: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    /// A unique, generated name for the cluster, used to tag cloud resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<PlatformStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct PlatformStatus {
    #[serde(rename = "type", default)]
    pub platform_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsPlatformStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct AwsPlatformStatus {
    #[serde(default)]
    pub region: String,
}

impl Infrastructure {
    /// The infrastructure name from the status, if it is set and non-empty.
    pub fn infrastructure_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.infrastructure_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// The AWS region from the platform status, if it is set and non-empty.
    pub fn aws_region(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.platform_status.as_ref())
            .and_then(|p| p.aws.as_ref())
            .map(|aws| aws.region.as_str())
            .filter(|region| !region.is_empty())
    }
}

#[test]
fn deserialize_infrastructure() {
    let infra: Infrastructure = serde_json::from_value(serde_json::json!({
        "apiVersion": "config.openshift.io/v1",
        "kind": "Infrastructure",
        "metadata": { "name": "cluster" },
        "spec": { "platformSpec": { "type": "AWS" } },
        "status": {
            "infrastructureName": "example-x7k2p",
            "platformStatus": { "type": "AWS", "aws": { "region": "eu-west-1" } }
        }
    }))
    .unwrap();
    assert_eq!(infra.infrastructure_name(), Some("example-x7k2p"));
    assert_eq!(infra.aws_region(), Some("eu-west-1"));
}

#[test]
fn empty_status_fields() {
    let infra = Infrastructure {
        status: Some(InfrastructureStatus {
            infrastructure_name: Some(String::new()),
            platform_status: Some(PlatformStatus {
                platform_type: "AWS".to_string(),
                aws: Some(AwsPlatformStatus::default()),
            }),
        }),
        ..Infrastructure::new("cluster", InfrastructureSpec::default())
    };
    assert_eq!(infra.infrastructure_name(), None);
    assert_eq!(infra.aws_region(), None);
}
