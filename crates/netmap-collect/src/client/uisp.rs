use super::{join_url, parse_records, SourceOutcome, CONTROLLER_TIMEOUT};
use crate::raw::{UispDataLink, UispDevice, UispSite};
use crate::{CollectError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Path prefix of the UISP NMS API.
pub const UISP_API_PREFIX: &str = "/nms/api/v2.1";

/// Connection settings for a UISP instance.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UispConfig {
    /// Instance base URL.
    pub url: String,
    /// API token sent as `x-auth-token`.
    pub api_token: String,
    /// Verify the instance's TLS certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

impl std::fmt::Debug for UispConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UispConfig")
            .field("url", &self.url)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Token-authenticated UISP client.
pub struct UispClient {
    config: UispConfig,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for UispClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UispClient")
            .field("config", &self.config)
            .finish()
    }
}

impl UispClient {
    /// Create a client.
    pub fn new(config: UispConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CONTROLLER_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self { config, client })
    }

    /// Full URL of an API resource, e.g. `devices`.
    pub fn endpoint_url(&self, resource: &str) -> String {
        join_url(&self.config.url, &format!("{}/{}", UISP_API_PREFIX, resource))
    }

    fn fetch_list<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.endpoint_url(resource))
            .header("x-auth-token", &self.config.api_token)
            .header("accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(CollectError::UnexpectedStatus {
                endpoint: resource.to_string(),
                status: response.status().as_u16(),
            });
        }

        match response.json::<Value>()? {
            Value::Array(items) => Ok(parse_records(items, resource)),
            _ => {
                warn!(resource, "Expected a JSON array");
                Ok(Vec::new())
            }
        }
    }

    /// `GET /devices`.
    pub fn devices(&self) -> SourceOutcome<Vec<UispDevice>> {
        SourceOutcome::from_result(self.fetch_list("devices"))
    }

    /// `GET /sites`.
    pub fn sites(&self) -> SourceOutcome<Vec<UispSite>> {
        SourceOutcome::from_result(self.fetch_list("sites"))
    }

    /// `GET /data-links`.
    pub fn data_links(&self) -> SourceOutcome<Vec<UispDataLink>> {
        SourceOutcome::from_result(self.fetch_list("data-links"))
    }
}
