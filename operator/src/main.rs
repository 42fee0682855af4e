/*!

Bootstraps the AWS load balancer operator and emits the resulting startup configuration as JSON.

!*/

use albo_model::constants::DEFAULT_OPERATOR_NAMESPACE;
use albo_model::KubeStore;
use albo_operator::aws::Ec2ClientFactory;
use albo_operator::wait::WaitPolicy;
use albo_operator::{bootstrap, init_logger, BootstrapConfig, BootstrapOptions, Bootstrapped};
use clap::Parser;
use log::{info, LevelFilter};
use snafu::{ResultExt, Snafu};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Discover the AWS cluster, provision operator credentials and resolve the cluster VPC.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the kubeconfig file. If not given, the in-cluster configuration is used.
    #[clap(long = "kubeconfig", env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,
    /// The namespace the operator runs in. The credentials secret is issued into it.
    #[clap(long = "namespace", env = "OPERATOR_NAMESPACE", default_value = DEFAULT_OPERATOR_NAMESPACE)]
    namespace: String,
    /// How long to wait for the credentials secret to be issued.
    #[clap(long = "secret-timeout-secs", default_value = "300")]
    secret_timeout_secs: u64,
    /// How often to check whether the credentials secret has been issued.
    #[clap(long = "secret-poll-interval-secs", default_value = "5")]
    secret_poll_interval_secs: u64,
    /// How long to retry the first AWS call while the new credentials become usable.
    #[clap(long = "aws-request-timeout-secs", default_value = "20")]
    aws_request_timeout_secs: u64,
    /// How often to retry the first AWS call.
    #[clap(long = "aws-request-poll-interval-secs", default_value = "1")]
    aws_request_poll_interval_secs: u64,
    /// Write the bootstrap configuration to this file instead of stdout.
    #[clap(long = "output")]
    output: Option<PathBuf>,
}

impl Args {
    fn bootstrap_options(&self) -> BootstrapOptions {
        let mut options = BootstrapOptions::new(&self.namespace);
        options.provision.secret_wait = WaitPolicy::new(
            Duration::from_secs(self.secret_timeout_secs),
            Duration::from_secs(self.secret_poll_interval_secs),
        );
        options.vpc_wait = WaitPolicy::new(
            Duration::from_secs(self.aws_request_timeout_secs),
            Duration::from_secs(self.aws_request_poll_interval_secs),
        );
        options
    }
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("{}", source))]
    Bootstrap { source: albo_operator::Error },

    #[snafu(display("Unable to create Kubernetes client: {}", source))]
    Store { source: albo_model::StoreError },

    #[snafu(display("Unable to write '{}': {}", path.display(), source))]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling bootstrap");
            canceller.cancel();
        }
    });

    if let Err(e) = run(args, &cancel).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args, cancel: &CancellationToken) -> Result<(), Error> {
    let store = match &args.kubeconfig {
        Some(path) => KubeStore::new_from_kubeconfig_path(path).await,
        None => KubeStore::new().await,
    }
    .context(StoreSnafu)?;

    let Bootstrapped { config, .. } = bootstrap(
        &store,
        &Ec2ClientFactory,
        &args.bootstrap_options(),
        cancel,
    )
    .await
    .context(BootstrapSnafu)?;

    write_config(&config, args.output.as_ref())
}

fn write_config(config: &BootstrapConfig, output: Option<&PathBuf>) -> Result<(), Error> {
    match output {
        Some(path) => {
            std::fs::write(path, config.to_string()).context(WriteOutputSnafu { path })?;
            info!("Wrote bootstrap configuration to '{}'", path.display());
        }
        None => println!("{}", config),
    }
    Ok(())
}
