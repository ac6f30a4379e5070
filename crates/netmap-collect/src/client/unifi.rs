use super::{join_url, parse_records, SourceOutcome, CONTROLLER_TIMEOUT};
use crate::raw::UnifiDevice;
use crate::{CollectError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Connection settings for a UniFi Network controller.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiConfig {
    /// Controller base URL, e.g. `https://192.168.1.1`.
    pub url: String,
    /// Local admin username.
    pub username: String,
    /// Local admin password.
    pub password: String,
    /// Site name.
    #[serde(default = "default_site")]
    pub site: String,
    /// Verify the controller's TLS certificate.
    #[serde(default)]
    pub verify_tls: bool,
}

fn default_site() -> String {
    "default".to_string()
}

impl std::fmt::Debug for UnifiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("site", &self.site)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Controller generation, detected by which login path succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerFlavor {
    /// UniFi OS consoles (UDM, Cloud Key Gen2+).
    UnifiOs,
    /// Self-hosted Network application.
    Legacy,
}

impl ControllerFlavor {
    /// Login order.
    pub const PROBE_ORDER: [ControllerFlavor; 2] =
        [ControllerFlavor::UnifiOs, ControllerFlavor::Legacy];

    /// Login endpoint path.
    pub fn login_path(&self) -> &'static str {
        match self {
            ControllerFlavor::UnifiOs => "/api/auth/login",
            ControllerFlavor::Legacy => "/api/login",
        }
    }

    /// Device listing path for `site`.
    pub fn device_path(&self, site: &str) -> String {
        let endpoint = format!("/api/s/{}/stat/device", site);
        match self {
            ControllerFlavor::UnifiOs => format!("/proxy/network{}", endpoint),
            ControllerFlavor::Legacy => endpoint,
        }
    }
}

/// Session-based UniFi client.
pub struct UnifiClient {
    config: UnifiConfig,
    client: reqwest::blocking::Client,
    flavor: Option<ControllerFlavor>,
}

impl std::fmt::Debug for UnifiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiClient")
            .field("config", &self.config)
            .field("flavor", &self.flavor)
            .finish()
    }
}

impl UnifiClient {
    /// Create a client; no request is made until [`login`](Self::login).
    pub fn new(config: UnifiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CONTROLLER_TIMEOUT)
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            config,
            client,
            flavor: None,
        })
    }

    /// Flavor detected at login.
    pub fn flavor(&self) -> Option<ControllerFlavor> {
        self.flavor
    }

    /// Authenticate, trying the UniFi OS path before the legacy one.
    pub fn login(&mut self) -> Result<ControllerFlavor> {
        let payload = json!({
            "username": self.config.username,
            "password": self.config.password,
            "remember": true,
        });

        let mut last_status = 0;
        for flavor in ControllerFlavor::PROBE_ORDER {
            let url = join_url(&self.config.url, flavor.login_path());
            let response = self.client.post(&url).json(&payload).send()?;
            let status = response.status();
            if status.is_success() {
                info!(url = %self.config.url, ?flavor, "Logged in to UniFi controller");
                self.flavor = Some(flavor);
                return Ok(flavor);
            }
            debug!(%url, status = status.as_u16(), "Login path rejected");
            last_status = status.as_u16();
        }

        Err(CollectError::LoginFailed {
            url: self.config.url.clone(),
            status: last_status,
        })
    }

    /// List devices on the configured site. Requires a prior login.
    pub fn fetch_devices(&self) -> Result<Vec<UnifiDevice>> {
        let flavor = self
            .flavor
            .ok_or_else(|| CollectError::NotLoggedIn(self.config.url.clone()))?;
        let endpoint = flavor.device_path(&self.config.site);
        let response = self
            .client
            .get(join_url(&self.config.url, &endpoint))
            .send()?;

        if !response.status().is_success() {
            return Err(CollectError::UnexpectedStatus {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json()?;
        Ok(parse_records(data_array(body), "unifi"))
    }

    /// Log in if needed and list devices, folding any failure into the outcome.
    pub fn collect_devices(&mut self) -> SourceOutcome<Vec<UnifiDevice>> {
        if self.flavor.is_none() {
            if let Err(e) = self.login() {
                return SourceOutcome::Failed(e.to_string());
            }
        }
        SourceOutcome::from_result(self.fetch_devices())
    }
}

/// The `data` array of a controller envelope; anything else is empty.
fn data_array(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
