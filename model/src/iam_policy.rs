use crate::credentials_request::StatementEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const IAM_POLICY_VERSION: &str = "2012-10-17";

const CLUSTER_REQUEST_TAG: &str = "aws:RequestTag/elbv2.k8s.aws/cluster";
const CLUSTER_RESOURCE_TAG: &str = "aws:ResourceTag/elbv2.k8s.aws/cluster";

/// An IAM policy document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

/// A statement of an IAM policy document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: BTreeMap<String, BTreeMap<String, Value>>,
}

impl PolicyDocument {
    /// Flatten the document into the statement entries of a credentials request. Credentials
    /// request statements name a single resource, so a statement with several resources becomes
    /// several entries.
    pub fn statement_entries(&self) -> Vec<StatementEntry> {
        self.statement
            .iter()
            .flat_map(|statement| {
                statement.resource.iter().map(|resource| StatementEntry {
                    effect: statement.effect.clone(),
                    action: statement.action.clone(),
                    resource: resource.clone(),
                    policy_condition: statement.condition.clone(),
                })
            })
            .collect()
    }
}

fn allow(actions: &[&str], resources: &[&str]) -> PolicyStatement {
    PolicyStatement {
        effect: "Allow".to_string(),
        action: actions.iter().map(|s| s.to_string()).collect(),
        resource: resources.iter().map(|s| s.to_string()).collect(),
        condition: BTreeMap::new(),
    }
}

fn condition(operator: &str, key: &str, value: Value) -> BTreeMap<String, BTreeMap<String, Value>> {
    let mut inner = BTreeMap::new();
    inner.insert(key.to_string(), value);
    let mut outer = BTreeMap::new();
    outer.insert(operator.to_string(), inner);
    outer
}

fn with_condition(
    mut statement: PolicyStatement,
    condition: BTreeMap<String, BTreeMap<String, Value>>,
) -> PolicyStatement {
    statement.condition = condition;
    statement
}

/// The permissions the operator and its operand need to manage load balancers for the cluster.
pub fn iam_policy() -> PolicyDocument {
    let tagged_elb_resources = [
        "arn:aws:elasticloadbalancing:*:*:targetgroup/*/*",
        "arn:aws:elasticloadbalancing:*:*:loadbalancer/net/*/*",
        "arn:aws:elasticloadbalancing:*:*:loadbalancer/app/*/*",
    ];
    PolicyDocument {
        version: IAM_POLICY_VERSION.to_string(),
        statement: vec![
            with_condition(
                allow(&["iam:CreateServiceLinkedRole"], &["*"]),
                condition(
                    "StringEquals",
                    "iam:AWSServiceName",
                    Value::from("elasticloadbalancing.amazonaws.com"),
                ),
            ),
            allow(
                &[
                    "ec2:DescribeAccountAttributes",
                    "ec2:DescribeAddresses",
                    "ec2:DescribeAvailabilityZones",
                    "ec2:DescribeInternetGateways",
                    "ec2:DescribeVpcs",
                    "ec2:DescribeVpcPeeringConnections",
                    "ec2:DescribeSubnets",
                    "ec2:DescribeSecurityGroups",
                    "ec2:DescribeInstances",
                    "ec2:DescribeNetworkInterfaces",
                    "ec2:DescribeTags",
                    "ec2:GetCoipPoolUsage",
                    "ec2:DescribeCoipPools",
                    "elasticloadbalancing:DescribeLoadBalancers",
                    "elasticloadbalancing:DescribeLoadBalancerAttributes",
                    "elasticloadbalancing:DescribeListeners",
                    "elasticloadbalancing:DescribeListenerCertificates",
                    "elasticloadbalancing:DescribeSSLPolicies",
                    "elasticloadbalancing:DescribeRules",
                    "elasticloadbalancing:DescribeTargetGroups",
                    "elasticloadbalancing:DescribeTargetGroupAttributes",
                    "elasticloadbalancing:DescribeTargetHealth",
                    "elasticloadbalancing:DescribeTags",
                ],
                &["*"],
            ),
            allow(
                &[
                    "cognito-idp:DescribeUserPoolClient",
                    "acm:ListCertificates",
                    "acm:DescribeCertificate",
                    "iam:ListServerCertificates",
                    "iam:GetServerCertificate",
                    "waf-regional:GetWebACL",
                    "waf-regional:GetWebACLForResource",
                    "waf-regional:AssociateWebACL",
                    "waf-regional:DisassociateWebACL",
                    "wafv2:GetWebACL",
                    "wafv2:GetWebACLForResource",
                    "wafv2:AssociateWebACL",
                    "wafv2:DisassociateWebACL",
                    "shield:GetSubscriptionState",
                    "shield:DescribeProtection",
                    "shield:CreateProtection",
                    "shield:DeleteProtection",
                ],
                &["*"],
            ),
            allow(
                &[
                    "ec2:AuthorizeSecurityGroupIngress",
                    "ec2:RevokeSecurityGroupIngress",
                ],
                &["*"],
            ),
            allow(&["ec2:CreateSecurityGroup"], &["*"]),
            with_condition(
                allow(&["ec2:CreateTags"], &["arn:aws:ec2:*:*:security-group/*"]),
                condition(
                    "StringEquals",
                    "ec2:CreateAction",
                    Value::from("CreateSecurityGroup"),
                ),
            ),
            with_condition(
                allow(
                    &["ec2:CreateTags", "ec2:DeleteTags"],
                    &["arn:aws:ec2:*:*:security-group/*"],
                ),
                condition("Null", CLUSTER_RESOURCE_TAG, Value::from("false")),
            ),
            with_condition(
                allow(
                    &[
                        "ec2:AuthorizeSecurityGroupIngress",
                        "ec2:RevokeSecurityGroupIngress",
                        "ec2:DeleteSecurityGroup",
                    ],
                    &["*"],
                ),
                condition("Null", CLUSTER_RESOURCE_TAG, Value::from("false")),
            ),
            with_condition(
                allow(
                    &[
                        "elasticloadbalancing:CreateLoadBalancer",
                        "elasticloadbalancing:CreateTargetGroup",
                    ],
                    &["*"],
                ),
                condition("Null", CLUSTER_REQUEST_TAG, Value::from("false")),
            ),
            allow(
                &[
                    "elasticloadbalancing:CreateListener",
                    "elasticloadbalancing:DeleteListener",
                    "elasticloadbalancing:CreateRule",
                    "elasticloadbalancing:DeleteRule",
                ],
                &["*"],
            ),
            allow(
                &[
                    "elasticloadbalancing:AddTags",
                    "elasticloadbalancing:RemoveTags",
                ],
                &tagged_elb_resources,
            ),
            with_condition(
                allow(
                    &[
                        "elasticloadbalancing:ModifyLoadBalancerAttributes",
                        "elasticloadbalancing:SetIpAddressType",
                        "elasticloadbalancing:SetSecurityGroups",
                        "elasticloadbalancing:SetSubnets",
                        "elasticloadbalancing:DeleteLoadBalancer",
                        "elasticloadbalancing:ModifyTargetGroup",
                        "elasticloadbalancing:ModifyTargetGroupAttributes",
                        "elasticloadbalancing:DeleteTargetGroup",
                    ],
                    &["*"],
                ),
                condition("Null", CLUSTER_RESOURCE_TAG, Value::from("false")),
            ),
            allow(
                &[
                    "elasticloadbalancing:RegisterTargets",
                    "elasticloadbalancing:DeregisterTargets",
                ],
                &["arn:aws:elasticloadbalancing:*:*:targetgroup/*/*"],
            ),
            allow(
                &[
                    "elasticloadbalancing:SetWebAcl",
                    "elasticloadbalancing:ModifyListener",
                    "elasticloadbalancing:AddListenerCertificates",
                    "elasticloadbalancing:RemoveListenerCertificates",
                    "elasticloadbalancing:ModifyRule",
                ],
                &["*"],
            ),
        ],
    }
}
