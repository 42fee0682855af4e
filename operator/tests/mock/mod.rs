/*!

This test module provides mock implementations of the [`ObjectStore`], [`VpcLookup`] and
[`AwsClientFactory`] traits so that the bootstrap can be tested without Kubernetes or AWS.

!*/

#![allow(dead_code)]

use albo_model::{ObjectKey, ObjectStore, StoreError, StoreObject, StoreResult};
use albo_operator::aws::{AwsClientFactory, LookupError, VpcLookup};
use kube::error::ErrorResponse;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

type StoreKey = (String, ObjectKey);

fn api_error(method: &str, kind: String, key: ObjectKey, code: u16, reason: &str) -> StoreError {
    StoreError::KubeApiCall {
        method: method.to_string(),
        kind,
        key,
        source: kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("mock {}", reason),
            reason: reason.to_string(),
            code,
        }),
    }
}

/// An in-memory object store that behaves like the API server for `get` and `create`.
#[derive(Default)]
pub struct MockStore {
    objects: Mutex<HashMap<StoreKey, Value>>,
    /// Objects that only become visible after the given number of failed reads, as if created by
    /// another actor in the meantime.
    delayed: Mutex<HashMap<StoreKey, (u32, Value)>>,
    /// When set, every `create` fails with this status code and reason.
    create_failure: Option<(u16, String)>,
    /// When set, every `get` fails with this status code and reason.
    get_failure: Option<(u16, String)>,
    creates: AtomicU32,
    gets: AtomicU32,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object<K>(self, object: K) -> Self
    where
        K: StoreObject,
    {
        self.objects.lock().unwrap().insert(
            (K::kind_name(), ObjectKey::of(&object)),
            serde_json::to_value(&object).unwrap(),
        );
        self
    }

    pub fn with_object_after_reads<K>(self, object: K, reads: u32) -> Self
    where
        K: StoreObject,
    {
        self.delayed.lock().unwrap().insert(
            (K::kind_name(), ObjectKey::of(&object)),
            (reads, serde_json::to_value(&object).unwrap()),
        );
        self
    }

    pub fn with_create_failure(mut self, code: u16, reason: &str) -> Self {
        self.create_failure = Some((code, reason.to_string()));
        self
    }

    pub fn with_get_failure(mut self, code: u16, reason: &str) -> Self {
        self.get_failure = Some((code, reason.to_string()));
        self
    }

    pub fn object<K>(&self, key: &ObjectKey) -> Option<K>
    where
        K: StoreObject,
    {
        self.objects
            .lock()
            .unwrap()
            .get(&(K::kind_name(), key.clone()))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// The number of successful creates.
    pub fn creates(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockStore {
    async fn get<K>(&self, key: &ObjectKey) -> StoreResult<K>
    where
        K: StoreObject,
    {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some((code, reason)) = &self.get_failure {
            return Err(api_error("get", K::kind_name(), key.clone(), *code, reason));
        }
        let store_key = (K::kind_name(), key.clone());
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&store_key) {
            let mut delayed = self.delayed.lock().unwrap();
            if let Some((reads, _)) = delayed.get_mut(&store_key) {
                if *reads == 0 {
                    if let Some((_, value)) = delayed.remove(&store_key) {
                        objects.insert(store_key.clone(), value);
                    }
                } else {
                    *reads -= 1;
                }
            }
        }
        match objects.get(&store_key) {
            Some(value) => Ok(serde_json::from_value(value.clone()).unwrap()),
            None => Err(api_error("get", K::kind_name(), key.clone(), 404, "NotFound")),
        }
    }

    async fn create<K>(&self, object: &K) -> StoreResult<K>
    where
        K: StoreObject,
    {
        let key = ObjectKey::of(object);
        if let Some((code, reason)) = &self.create_failure {
            return Err(api_error("create", K::kind_name(), key, *code, reason));
        }
        let mut objects = self.objects.lock().unwrap();
        let store_key = (K::kind_name(), key.clone());
        if objects.contains_key(&store_key) {
            return Err(api_error("create", K::kind_name(), key, 409, "AlreadyExists"));
        }
        objects.insert(store_key, serde_json::to_value(object).unwrap());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(object.clone())
    }
}

/// A VPC lookup that fails a fixed number of times before returning its VPC id. Without a VPC id
/// it never succeeds.
pub struct MockVpcLookup {
    vpc_id: Option<String>,
    failures: u32,
    calls: AtomicU32,
}

impl MockVpcLookup {
    pub fn new(vpc_id: &str, failures: u32) -> Self {
        Self {
            vpc_id: Some(vpc_id.to_string()),
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn never() -> Self {
        Self {
            vpc_id: None,
            failures: 0,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VpcLookup for MockVpcLookup {
    async fn vpc_id(&self, cluster_name: &str) -> Result<String, LookupError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.vpc_id {
            Some(vpc_id) if call > self.failures => Ok(vpc_id.clone()),
            _ => Err(LookupError::NoVpc {
                tag: format!("kubernetes.io/cluster/{}", cluster_name),
            }),
        }
    }
}

/// Creates `MockVpcLookup`s and remembers what it was asked for.
pub struct MockAwsFactory {
    vpc_id: String,
    failures: u32,
    /// The region, credentials file and the file contents at the time of each request.
    pub requests: Mutex<Vec<(String, PathBuf, Vec<u8>)>>,
}

impl MockAwsFactory {
    pub fn new(vpc_id: &str, failures: u32) -> Self {
        Self {
            vpc_id: vpc_id.to_string(),
            failures,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl AwsClientFactory for MockAwsFactory {
    type Client = MockVpcLookup;

    async fn new_client(
        &self,
        region: &str,
        credentials_file: &Path,
    ) -> albo_operator::Result<Self::Client> {
        let contents = std::fs::read(credentials_file).unwrap();
        self.requests.lock().unwrap().push((
            region.to_string(),
            credentials_file.to_path_buf(),
            contents,
        ));
        Ok(MockVpcLookup::new(&self.vpc_id, self.failures))
    }
}
