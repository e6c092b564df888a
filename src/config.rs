//! Driver configuration.

use serde::Deserialize;

use crate::errors::{Error, Result};

/// The only DynamoDB API version the SDK speaks.
pub const API_VERSION: &str = "2012-08-10";

pub(crate) const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for [`DynamoDriver`](crate::DynamoDriver).
///
/// Credentials are resolved in this order:
/// 1. `access_key` + `secret_key` (and `session_token` when given)
/// 2. `profile` from the shared AWS config files
/// 3. the default provider chain (environment, instance role, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// AWS region. Falls back to the SDK's default region chain
    /// (`AWS_REGION`, `AWS_DEFAULT_REGION`, the shared config profile), then us-east-1.
    pub region: Option<String>,
    /// API version, `latest` or `2012-08-10`.
    pub version: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
    /// Custom endpoint for DynamoDB Local or LocalStack.
    pub endpoint_url: Option<String>,
}

impl DriverConfig {
    /// Config with a region and static credentials.
    pub fn new(
        region: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        DriverConfig {
            region: Some(region.into()),
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
            ..Default::default()
        }
    }

    /// Read the config from the standard AWS environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        DriverConfig {
            region: var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")),
            version: var("DYNAMODB_API_VERSION"),
            access_key: var("AWS_ACCESS_KEY_ID"),
            secret_key: var("AWS_SECRET_ACCESS_KEY"),
            session_token: var("AWS_SESSION_TOKEN"),
            profile: var("AWS_PROFILE"),
            endpoint_url: var("AWS_ENDPOINT_URL"),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Check the settings that can be checked without contacting AWS.
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = self.version.as_deref() {
            if version != "latest" && version != API_VERSION {
                return Err(Error::Config(format!(
                    "unsupported API version '{}', use 'latest' or '{}'",
                    version, API_VERSION
                )));
            }
        }

        match (&self.access_key, &self.secret_key) {
            (Some(_), None) => Err(Error::Config(
                "access_key is set but secret_key is missing".to_string(),
            )),
            (None, Some(_)) => Err(Error::Config(
                "secret_key is set but access_key is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
