use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Invalid ARN '{}': {}", value, reason))]
    ArnParse { value: String, reason: String },

    #[snafu(display("Error encoding AWS provider spec: {}", source))]
    ProviderSpecEncode { source: serde_json::Error },

    #[snafu(display("Error decoding AWS provider spec: {}", source))]
    ProviderSpecDecode { source: serde_json::Error },

    #[snafu(display("Expected provider spec of kind '{}' but got '{}'", expected, found))]
    ProviderSpecKind { expected: String, found: String },

    #[snafu(display("Credentials request '{}' has no provider spec", name))]
    ProviderSpecMissing { name: String },
}
