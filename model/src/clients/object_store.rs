use super::error::{self, StoreResult};
use crate::{CredentialsRequest, Infrastructure};
use core::fmt::Debug;
use k8s_openapi::api::core::v1::Secret;
use kube::api::PostParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Resource, ResourceExt};
use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// The namespace and name of an object. Cluster scoped objects have no namespace.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn namespaced<S1, S2>(namespace: S1, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn cluster<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// The key of an existing object, taken from its metadata.
    pub fn of<K>(object: &K) -> Self
    where
        K: Resource,
    {
        Self {
            namespace: object.namespace(),
            name: object.name_any(),
        }
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A Kubernetes object type that can be read from and written to an `ObjectStore`.
pub trait StoreObject:
    Resource<DynamicType = ()> + Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static
{
    /// Create the API handle for this type. Namespaced types fall back to the client's default
    /// namespace when `namespace` is `None`; cluster scoped types ignore it.
    fn create_api(k8s_client: kube::Client, namespace: Option<&str>) -> Api<Self>;

    fn kind_name() -> String {
        Self::kind(&()).to_string()
    }
}

impl StoreObject for Secret {
    fn create_api(k8s_client: kube::Client, namespace: Option<&str>) -> Api<Self> {
        match namespace {
            Some(namespace) => Api::namespaced(k8s_client, namespace),
            None => Api::default_namespaced(k8s_client),
        }
    }
}

impl StoreObject for CredentialsRequest {
    fn create_api(k8s_client: kube::Client, namespace: Option<&str>) -> Api<Self> {
        match namespace {
            Some(namespace) => Api::namespaced(k8s_client, namespace),
            None => Api::default_namespaced(k8s_client),
        }
    }
}

impl StoreObject for Infrastructure {
    fn create_api(k8s_client: kube::Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(k8s_client)
    }
}

/// Typed access to cluster objects by namespaced name. Implementations must report a missing
/// object and a conflicting create in a way that `HttpStatusCode::is_not_found` and
/// `HttpStatusCode::is_already_exists` recognize.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get<K>(&self, key: &ObjectKey) -> StoreResult<K>
    where
        K: StoreObject;

    async fn create<K>(&self, object: &K) -> StoreResult<K>
    where
        K: StoreObject;
}

/// An `ObjectStore` backed by the Kubernetes API server. Reads are not cached.
#[derive(Clone)]
pub struct KubeStore {
    k8s_client: kube::Client,
}

impl KubeStore {
    /// Create a store using the inferred kubeconfig (in-cluster service account or
    /// `KUBECONFIG`).
    pub async fn new() -> StoreResult<Self> {
        let k8s_client = kube::Client::try_default()
            .await
            .context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(k8s_client))
    }

    /// Create a store from the kubeconfig file at `path`.
    pub async fn new_from_kubeconfig_path(path: &Path) -> StoreResult<Self> {
        let kubeconfig = Kubeconfig::read_from(path).context(error::KubeconfigSnafu { path })?;
        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::KubeconfigSnafu { path })?;
        let k8s_client = kube::Client::try_from(config).context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(k8s_client))
    }

    pub fn new_from_k8s_client(k8s_client: kube::Client) -> Self {
        Self { k8s_client }
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeStore {
    async fn get<K>(&self, key: &ObjectKey) -> StoreResult<K>
    where
        K: StoreObject,
    {
        trace!("getting {} '{}'", K::kind_name(), key);
        K::create_api(self.k8s_client.clone(), key.namespace.as_deref())
            .get(&key.name)
            .await
            .context(error::KubeApiCallSnafu {
                method: "get",
                kind: K::kind_name(),
                key: key.clone(),
            })
    }

    async fn create<K>(&self, object: &K) -> StoreResult<K>
    where
        K: StoreObject,
    {
        let key = ObjectKey::of(object);
        trace!("creating {} '{}'", K::kind_name(), key);
        K::create_api(self.k8s_client.clone(), key.namespace.as_deref())
            .create(&PostParams::default(), object)
            .await
            .context(error::KubeApiCallSnafu {
                method: "create",
                kind: K::kind_name(),
                key,
            })
    }
}

#[test]
fn object_key_display() {
    assert_eq!(
        ObjectKey::namespaced("aws-load-balancer-operator", "credentials").to_string(),
        "aws-load-balancer-operator/credentials"
    );
    assert_eq!(ObjectKey::cluster("cluster").to_string(), "cluster");
}

#[test]
fn object_key_of_object() {
    let mut secret = Secret::default();
    secret.metadata.name = Some("creds".to_string());
    secret.metadata.namespace = Some("operator".to_string());
    assert_eq!(
        ObjectKey::of(&secret),
        ObjectKey::namespaced("operator", "creds")
    );
}
