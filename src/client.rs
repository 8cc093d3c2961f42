use crate::error::{CoraError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::Identity;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding the OAuth2 client id
pub const ENV_CLIENT_ID: &str = "CORA_CLIENT_ID";
/// Environment variable holding the path of the client certificate (PEM)
pub const ENV_CERT_PATH: &str = "CORA_CERT_PATH";
/// Environment variable holding the path of the client private key (PKCS#8 PEM)
pub const ENV_KEY_PATH: &str = "CORA_KEY_PATH";
/// Environment variable selecting `sandbox` (default) or `production`
pub const ENV_ENVIRONMENT: &str = "CORA_ENV";

const PRODUCTION_BASE_URL: &str = "https://matls-clients.api.cora.com.br";
const SANDBOX_BASE_URL: &str = "https://matls-clients.api.stage.cora.com.br";
const PRODUCTION_PAYMENTS_URL: &str = "https://api.cora.com.br";
const SANDBOX_PAYMENTS_URL: &str = "https://api.stage.cora.com.br";

/// Target Cora environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoraError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(CoraError::InvalidConfiguration(format!(
                "unknown environment: {}",
                other
            ))),
        }
    }
}

/// Credentials and endpoint configuration for the Cora API
#[derive(Debug, Clone)]
pub struct Config {
    client_id: String,
    cert_path: String,
    key_path: String,
    environment: Environment,
    base_url_override: Option<String>,
    payments_url_override: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl Config {
    /// Create a new configuration, validating the environment name
    ///
    /// # Arguments
    /// * `client_id` - OAuth2 client id issued by Cora
    /// * `cert_path` - Path to the client certificate (PEM)
    /// * `key_path` - Path to the client private key (PKCS#8 PEM)
    /// * `environment` - `"sandbox"` or `"production"`
    pub fn new(
        client_id: impl Into<String>,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
        environment: &str,
    ) -> Result<Self> {
        let environment = environment.parse()?;
        Ok(Self::with_environment(client_id, cert_path, key_path, environment))
    }

    /// Create a sandbox configuration
    pub fn sandbox(
        client_id: impl Into<String>,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        Self::with_environment(client_id, cert_path, key_path, Environment::Sandbox)
    }

    pub fn with_environment(
        client_id: impl Into<String>,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Config {
            client_id: client_id.into(),
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            environment,
            base_url_override: None,
            payments_url_override: None,
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Build a configuration from the `CORA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let (client_id, cert_path, key_path) =
            match (read(ENV_CLIENT_ID), read(ENV_CERT_PATH), read(ENV_KEY_PATH)) {
                (Some(id), Some(cert), Some(key)) => (id, cert, key),
                _ => {
                    return Err(CoraError::MissingConfiguration(format!(
                        "environment variables {}, {} and {} are required",
                        ENV_CLIENT_ID, ENV_CERT_PATH, ENV_KEY_PATH
                    )))
                }
            };

        let environment = match read(ENV_ENVIRONMENT) {
            Some(name) => name.parse()?,
            None => Environment::Sandbox,
        };

        Ok(Self::with_environment(client_id, cert_path, key_path, environment))
    }

    /// Send API calls to `url` instead of the environment's mTLS host
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    /// Send payment initiation calls to `url` instead of the environment's payments host
    pub fn with_payments_base_url(mut self, url: impl Into<String>) -> Self {
        self.payments_url_override = Some(url.into());
        self
    }

    /// Set the total request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection establishment timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn cert_path(&self) -> &str {
        &self.cert_path
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the base URL for token and API requests
    pub fn base_url(&self) -> &str {
        if let Some(ref url) = self.base_url_override {
            return url;
        }
        match self.environment {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    /// Get the base URL for payment initiation requests
    pub fn payments_base_url(&self) -> &str {
        if let Some(ref url) = self.payments_url_override {
            return url;
        }
        match self.environment {
            Environment::Production => PRODUCTION_PAYMENTS_URL,
            Environment::Sandbox => SANDBOX_PAYMENTS_URL,
        }
    }
}

/// Load the client certificate and key referenced by `config` as a TLS identity
pub fn load_identity(config: &Config) -> Result<Identity> {
    let cert = std::fs::read(&config.cert_path).map_err(|e| {
        CoraError::InvalidConfiguration(format!(
            "cannot read certificate {}: {}",
            config.cert_path, e
        ))
    })?;
    let key = std::fs::read(&config.key_path).map_err(|e| {
        CoraError::InvalidConfiguration(format!("cannot read key {}: {}", config.key_path, e))
    })?;

    Identity::from_pkcs8_pem(&cert, &key).map_err(|e| {
        CoraError::InvalidConfiguration(format!("invalid client certificate or key: {}", e))
    })
}

/// Create the HTTP client for Cora API requests, presenting the configured
/// client certificate on every connection
pub fn create_http_client(config: &Config) -> Result<Client> {
    let identity = load_identity(config)?;

    ClientBuilder::new()
        .identity(identity)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| CoraError::InvalidConfiguration(format!("failed to create HTTP client: {}", e)))
}
