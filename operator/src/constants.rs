use crate::wait::WaitPolicy;
use log::LevelFilter;
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// The cloud credential operator usually issues the secret within seconds, but may be busy.
pub const SECRET_WAIT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const SECRET_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const SECRET_WAIT_POLICY: WaitPolicy =
    WaitPolicy::new(SECRET_WAIT_TIMEOUT, SECRET_POLL_INTERVAL);

/// Freshly issued credentials may not be usable immediately, and VPC tags may lag behind VPC
/// creation, so the first AWS call is repeated for a while.
pub const AWS_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const AWS_REQUEST_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const AWS_REQUEST_WAIT_POLICY: WaitPolicy =
    WaitPolicy::new(AWS_REQUEST_TIMEOUT, AWS_REQUEST_POLL_INTERVAL);

pub const CREDENTIALS_FILE_PREFIX: &str = "albo-aws-shared-credentials-";
