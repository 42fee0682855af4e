use crate::error::{self, Error};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ARN_PREFIX: &str = "arn";
const ARN_SECTIONS: usize = 6;

/// An Amazon Resource Name of the form
/// `arn:<partition>:<service>:<region>:<account-id>:<resource>`. The region and account id may be
/// empty (IAM ARNs have no region), the remaining sections may not. The resource section may
/// itself contain `:`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account_id: String,
    resource: String,
}

impl Arn {
    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns `true` if `value` parses as an ARN.
    pub fn is_arn(value: &str) -> bool {
        value.parse::<Arn>().is_ok()
    }
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let sections: Vec<&str> = value.splitn(ARN_SECTIONS, ':').collect();
        ensure!(
            sections.first() == Some(&ARN_PREFIX),
            error::ArnParseSnafu {
                value,
                reason: "must start with 'arn:'"
            }
        );
        ensure!(
            sections.len() == ARN_SECTIONS,
            error::ArnParseSnafu {
                value,
                reason: format!("expected {} sections, found {}", ARN_SECTIONS, sections.len())
            }
        );
        let (partition, service, region, account_id, resource) = (
            sections[1],
            sections[2],
            sections[3],
            sections[4],
            sections[5],
        );
        for (what, section) in [
            ("partition", partition),
            ("service", service),
            ("resource", resource),
        ] {
            ensure!(
                !section.is_empty(),
                error::ArnParseSnafu {
                    value,
                    reason: format!("{} is empty", what)
                }
            );
        }
        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }
}

impl TryFrom<String> for Arn {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Arn> for String {
    fn from(arn: Arn) -> Self {
        arn.to_string()
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            ARN_PREFIX, self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

#[cfg(test)]
mod test {
    use super::Arn;

    #[test]
    fn iam_role() {
        let arn: Arn = "arn:aws:iam::123456789012:role/foo".parse().unwrap();
        assert_eq!(arn.partition(), "aws");
        assert_eq!(arn.service(), "iam");
        assert_eq!(arn.region(), "");
        assert_eq!(arn.account_id(), "123456789012");
        assert_eq!(arn.resource(), "role/foo");
        assert_eq!(arn.to_string(), "arn:aws:iam::123456789012:role/foo");
    }

    #[test]
    fn resource_with_colons() {
        let arn: Arn = "arn:aws-us-gov:logs:us-gov-west-1:123456789012:log-group:my-group:*"
            .parse()
            .unwrap();
        assert_eq!(arn.resource(), "log-group:my-group:*");
    }

    #[test]
    fn invalid() {
        for value in [
            "",
            "arn",
            "arn:aws:iam:role/foo",
            "aws:iam::123456789012:role/foo",
            "urn:aws:iam::123456789012:role/foo",
            "arn::iam::123456789012:role/foo",
            "arn:aws:::123456789012:role/foo",
            "arn:aws:iam::123456789012:",
        ] {
            assert!(!Arn::is_arn(value), "'{}' should not be an ARN", value);
        }
    }
}
