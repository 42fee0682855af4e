/// Helper macro to avoid retyping the API group of the cloud credential operator when creating
/// further string constants from it. When given no parameters, this returns the group name. When
/// given a string literal parameter it adds `/parameter` to the end.
macro_rules! cloudcredential {
    () => {
        "cloudcredential.openshift.io"
    };
    ($s:literal) => {
        concat!(cloudcredential!(), "/", $s)
    };
}

// API identifiers
pub const CLOUD_CREDENTIAL_GROUP: &str = cloudcredential!();
pub const CLOUD_CREDENTIAL_API_VERSION: &str = cloudcredential!("v1");
pub const AWS_PROVIDER_SPEC_KIND: &str = "AWSProviderSpec";

// Namespaces
pub const CLOUD_CREDENTIAL_NAMESPACE: &str = "openshift-cloud-credential-operator";
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "aws-load-balancer-operator";

// Object names
pub const CREDENTIALS_REQUEST_NAME: &str = "aws-load-balancer-operator";
pub const CREDENTIALS_SECRET_NAME: &str = "aws-load-balancer-operator";
pub const CLUSTER_INFRASTRUCTURE_NAME: &str = "cluster";
pub const OPERATOR_SERVICE_ACCOUNT: &str = "aws-load-balancer-operator-controller-manager";

// Secret keys
pub const CREDENTIALS_KEY: &str = "credentials";

// Environment variables
pub const ENV_ROLE_ARN: &str = "ROLEARN";

// Paths
pub const WEB_IDENTITY_TOKEN_PATH: &str = "/var/run/secrets/openshift/serviceaccount/token";

// Tags
pub const CLUSTER_OWNERSHIP_TAG_PREFIX: &str = "kubernetes.io/cluster/";

/// The tag key that marks AWS resources as belonging to the cluster `cluster_name`.
pub fn cluster_ownership_tag(cluster_name: &str) -> String {
    format!("{}{}", CLUSTER_OWNERSHIP_TAG_PREFIX, cluster_name)
}

#[test]
fn cloudcredential_constants_macro_test() {
    assert_eq!("cloudcredential.openshift.io", cloudcredential!());
    assert_eq!("cloudcredential.openshift.io/v1", CLOUD_CREDENTIAL_API_VERSION);
    assert_eq!("cloudcredential.openshift.io/foo", cloudcredential!("foo"));
}

#[test]
fn cluster_ownership_tag_test() {
    assert_eq!(
        "kubernetes.io/cluster/example-x7k2p",
        cluster_ownership_tag("example-x7k2p")
    );
}
