/*!

`albo-operator` bootstraps the AWS load balancer operator: it discovers which AWS cluster it is
running in, provisions its own AWS credentials through the cloud credential operator, and resolves
the cluster VPC, producing the configuration the load balancer controller reconciler starts with.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub mod aws;
pub mod bootstrap;
pub mod cluster;
pub mod constants;
pub mod credentials;
mod error;
pub mod wait;

pub use bootstrap::{bootstrap, BootstrapConfig, BootstrapOptions, Bootstrapped};
pub use error::{Error, ErrorKind, Result};

use constants::DEFAULT_LOG_LEVEL;
use env_logger::Builder;
use log::LevelFilter;

/// Extract the value of `RUST_LOG` if it exists, otherwise log this workspace's crates at
/// `log_level` (or `DEFAULT_LOG_LEVEL`) and everything else at `Error`.
pub fn init_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level except AWS SDK.
            let log_level = log_level.unwrap_or(DEFAULT_LOG_LEVEL);
            Builder::new()
                // Set log level to Error for crates other than our own.
                .filter_level(LevelFilter::Error)
                // Set all of our crates to the desired level.
                .filter(Some(bin_crate), log_level)
                .filter(Some("albo_operator"), log_level)
                .filter(Some("albo_model"), log_level)
                .init();
        }
    }
}

/// Implement `Display` using `serde_json` `to_string_pretty` for types that implement Serialize.
#[macro_export]
macro_rules! impl_display_as_json {
    ($i:ident) => {
        impl std::fmt::Display for $i {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = serde_json::to_string_pretty(self)
                    .unwrap_or_else(|e| format!("Serialization failed: {}", e));
                std::fmt::Display::fmt(&s, f)
            }
        }
    };
}
