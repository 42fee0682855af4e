/*!

The `clients` module provides the cluster object store used during bootstrap. The store is the
only thing the bootstrap needs from Kubernetes: typed `get` and `create` by namespaced name, with
"not found" and "already exists" distinguishable from other failures.

!*/

mod error;
mod http_status_code;
mod object_store;

pub use error::{StoreError, StoreResult};
pub use http_status_code::{HttpStatusCode, StatusCode};
pub use object_store::{KubeStore, ObjectKey, ObjectStore, StoreObject};
