pub(crate) mod mock;

use albo_model::{AwsPlatformStatus, Infrastructure, InfrastructureStatus, PlatformStatus};
use albo_operator::cluster::{get_cluster_info, resolve_vpc_id};
use albo_operator::wait::WaitPolicy;
use albo_operator::{bootstrap, BootstrapOptions, ErrorKind};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use maplit::btreemap;
use mock::{MockAwsFactory, MockStore, MockVpcLookup};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const NAMESPACE: &str = "aws-load-balancer-operator";

fn infrastructure(name: Option<&str>, region: Option<&str>) -> Infrastructure {
    let mut infra = Infrastructure::new("cluster", Default::default());
    infra.status = Some(InfrastructureStatus {
        infrastructure_name: name.map(str::to_string),
        platform_status: Some(PlatformStatus {
            platform_type: "AWS".to_string(),
            aws: region.map(|region| AwsPlatformStatus {
                region: region.to_string(),
            }),
        }),
    });
    infra
}

fn credentials_secret() -> Secret {
    let mut secret = Secret {
        data: Some(btreemap! {
            "credentials".to_string() => ByteString(b"[default]\nrole_arn = arn:aws:iam::123456789012:role/albo\n".to_vec())
        }),
        ..Secret::default()
    };
    secret.metadata.name = Some("aws-load-balancer-operator".to_string());
    secret.metadata.namespace = Some(NAMESPACE.to_string());
    secret
}

#[tokio::test]
async fn cluster_info() {
    let store = MockStore::new().with_object(infrastructure(Some("example"), Some("us-east-1")));

    let info = get_cluster_info(&store).await.unwrap();

    assert_eq!(info.cluster_name, "example");
    assert_eq!(info.aws_region, "us-east-1");
}

#[tokio::test]
async fn cluster_info_missing_region() {
    let store = MockStore::new().with_object(infrastructure(Some("example"), None));

    let error = get_cluster_info(&store).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::IncompleteStatus);
}

#[tokio::test]
async fn cluster_info_empty_name() {
    let store = MockStore::new().with_object(infrastructure(Some(""), Some("us-east-1")));

    let error = get_cluster_info(&store).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::IncompleteStatus);
}

#[tokio::test]
async fn cluster_info_no_status() {
    let store = MockStore::new().with_object(Infrastructure::new("cluster", Default::default()));

    let error = get_cluster_info(&store).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::IncompleteStatus);
}

#[tokio::test]
async fn cluster_info_not_found() {
    let store = MockStore::new();

    let error = get_cluster_info(&store).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test(start_paused = true)]
async fn vpc_found_after_retries() {
    let lookup = MockVpcLookup::new("vpc-0123456789abcdef0", 2);
    let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_millis(10));

    let vpc_id = resolve_vpc_id(&lookup, "example", policy, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(vpc_id, "vpc-0123456789abcdef0");
    assert_eq!(lookup.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn vpc_never_found() {
    let lookup = MockVpcLookup::never();
    let policy = WaitPolicy::new(Duration::from_secs(20), Duration::from_secs(1));
    let start = Instant::now();

    let error = resolve_vpc_id(&lookup, "example", policy, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert!(start.elapsed() >= Duration::from_secs(20));
    assert!(start.elapsed() < Duration::from_secs(21));
    assert!(lookup.calls() >= 19);
    assert!(error.to_string().contains("kubernetes.io/cluster/example"));
}

#[tokio::test(start_paused = true)]
async fn bootstrap_with_mocks() {
    let dir = TempDir::new().unwrap();
    let store = MockStore::new()
        .with_object(infrastructure(Some("example"), Some("us-east-1")))
        .with_object_after_reads(credentials_secret(), 1);
    let aws = MockAwsFactory::new("vpc-0123456789abcdef0", 1);
    let mut options = BootstrapOptions::new(NAMESPACE);
    options.provision.role_arn = "arn:aws:iam::123456789012:role/albo".to_string();
    options.provision.credentials_dir = dir.path().to_path_buf();

    let bootstrapped = bootstrap(&store, &aws, &options, &CancellationToken::new())
        .await
        .unwrap();
    let config = bootstrapped.config;

    assert_eq!(config.cluster_name, "example");
    assert_eq!(config.aws_region, "us-east-1");
    assert_eq!(config.vpc_id, "vpc-0123456789abcdef0");
    assert_eq!(bootstrapped.client.calls(), 2);

    let requests = aws.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (region, path, contents) = &requests[0];
    assert_eq!(region, "us-east-1");
    assert_eq!(path, &config.credentials_file);
    assert_eq!(
        contents.as_slice(),
        credentials_secret().data.unwrap()["credentials"].0.as_slice()
    );

    let json: serde_json::Value = serde_json::from_str(&config.to_string()).unwrap();
    assert_eq!(json["vpcId"], "vpc-0123456789abcdef0");
    assert_eq!(json["awsRegion"], "us-east-1");
}

#[tokio::test]
async fn bootstrap_stops_before_provisioning() {
    let dir = TempDir::new().unwrap();
    let store = MockStore::new()
        .with_object(infrastructure(Some("example"), None))
        .with_object(credentials_secret());
    let aws = MockAwsFactory::new("vpc-0123456789abcdef0", 0);
    let mut options = BootstrapOptions::new(NAMESPACE);
    options.provision.role_arn = String::new();
    options.provision.credentials_dir = dir.path().to_path_buf();

    let error = bootstrap(&store, &aws, &options, &CancellationToken::new())
        .await
        .err()
        .unwrap();

    assert_eq!(error.kind(), ErrorKind::IncompleteStatus);
    assert_eq!(store.creates(), 0);
    assert!(aws.requests.lock().unwrap().is_empty());
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
