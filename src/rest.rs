use crate::client::{create_http_client, Config};
use crate::error::{CoraError, Result};
use crate::response::Response;
use crate::token::AccessToken;
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::debug;
use url::form_urlencoded;
use uuid::Uuid;

/// Header carrying the per-request idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

const TOKEN_PATH: &str = "/token";

/// Whether a request carries a freshly generated `Idempotency-Key` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Idempotency {
    /// POST, PUT and PATCH get a key, other verbs don't
    #[default]
    ByMethod,
    Always,
    Never,
}

impl Idempotency {
    /// Resolve the policy for a concrete HTTP method
    pub fn applies_to(&self, method: &Method) -> bool {
        match self {
            Idempotency::ByMethod => {
                *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
            }
            Idempotency::Always => true,
            Idempotency::Never => false,
        }
    }
}

/// Encoding of the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
}

impl BodyEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyEncoding::Json => "application/json",
            BodyEncoding::Form => "application/x-www-form-urlencoded",
        }
    }
}

/// Which Cora host a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// mTLS host serving `/token` and the banking APIs
    Api,
    /// Host serving payment initiation
    Payments,
}

/// A single outbound call, built per request and dropped afterwards
#[derive(Debug)]
pub(crate) struct RequestSpec<'a> {
    pub method: Method,
    pub host: Host,
    pub path: &'a str,
    pub payload: Option<&'a Value>,
    pub requires_auth: bool,
    pub encoding: BodyEncoding,
    pub idempotency: Idempotency,
}

/// Client for the Cora API.
///
/// Holds the mTLS-enabled HTTP client, the credential configuration and the
/// cached access token. All calls block the current thread. The client is
/// `Send + Sync`; share it behind an `Arc` to use it from several threads.
pub struct CoraClient {
    http: Client,
    config: Config,
    token: Mutex<Option<AccessToken>>,
}

impl CoraClient {
    /// Create a client presenting the certificate and key named in `config`
    pub fn new(config: Config) -> Result<Self> {
        let http = create_http_client(&config)?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client from the `CORA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Create a client on top of an already configured HTTP client.
    ///
    /// The caller is responsible for installing the TLS identity on `http`.
    pub fn with_http_client(config: Config, http: Client) -> Self {
        CoraClient {
            http,
            config,
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check whether a non-expired access token is cached
    pub fn has_valid_token(&self) -> bool {
        self.lock_token()
            .as_ref()
            .map(|t| t.is_valid_at(Utc::now()))
            .unwrap_or(false)
    }

    /// Obtain an access token through the client-credentials grant.
    ///
    /// A cached token that is still valid is returned without any network
    /// activity unless `force` is set. The token lock is held for the whole
    /// check-and-refresh so concurrent callers never run duplicate exchanges.
    pub fn authenticate(&self, force: bool) -> Result<String> {
        let mut cached = self.lock_token();

        if !force {
            if let Some(ref token) = *cached {
                if token.is_valid_at(Utc::now()) {
                    return Ok(token.value().to_string());
                }
            }
        }

        let params = json!({
            "grant_type": "client_credentials",
            "client_id": self.config.client_id(),
        });

        // requires_auth is false here, so execute() won't touch the lock we hold
        let response = self.execute(RequestSpec {
            method: Method::POST,
            host: Host::Api,
            path: TOKEN_PATH,
            payload: Some(&params),
            requires_auth: false,
            encoding: BodyEncoding::Form,
            idempotency: Idempotency::ByMethod,
        })?;

        let body = response.body.unwrap_or(Value::Null);
        let token = match AccessToken::from_response(&body, Utc::now()) {
            Ok(token) => token,
            Err(reason) => {
                return Err(CoraError::Api {
                    message: reason.to_string(),
                    status: response.status,
                    body: Some(body).filter(|b| !b.is_null()),
                })
            }
        };

        debug!(expires_at = %token.expires_at(), "obtained Cora access token");

        let value = token.value().to_string();
        *cached = Some(token);
        Ok(value)
    }

    /// Make an authenticated JSON request against the API host
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path beginning with `/`, including any query string
    /// * `payload` - JSON body, if any
    /// * `idempotency` - Idempotency-key policy
    pub fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        idempotency: Idempotency,
    ) -> Result<Response> {
        self.request_at(Host::Api, method, path, payload, idempotency)
    }

    /// Make an authenticated JSON request against the given host
    pub fn request_at(
        &self,
        host: Host,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        idempotency: Idempotency,
    ) -> Result<Response> {
        self.authenticate(false)?;

        self.execute(RequestSpec {
            method,
            host,
            path,
            payload,
            requires_auth: true,
            encoding: BodyEncoding::Json,
            idempotency,
        })
    }

    pub fn get(&self, path: &str) -> Result<Response> {
        self.request(Method::GET, path, None, Idempotency::ByMethod)
    }

    pub fn post<P: Serialize>(&self, path: &str, payload: &P) -> Result<Response> {
        let payload = to_json(payload)?;
        self.request(Method::POST, path, Some(&payload), Idempotency::ByMethod)
    }

    pub fn put<P: Serialize>(&self, path: &str, payload: &P) -> Result<Response> {
        let payload = to_json(payload)?;
        self.request(Method::PUT, path, Some(&payload), Idempotency::ByMethod)
    }

    pub fn patch<P: Serialize>(&self, path: &str, payload: &P) -> Result<Response> {
        let payload = to_json(payload)?;
        self.request(Method::PATCH, path, Some(&payload), Idempotency::ByMethod)
    }

    pub fn delete(&self, path: &str) -> Result<Response> {
        self.request(Method::DELETE, path, None, Idempotency::ByMethod)
    }

    /// Build, send and classify a single request.
    ///
    /// Shared by the token exchange and every authenticated call.
    pub(crate) fn execute(&self, call: RequestSpec<'_>) -> Result<Response> {
        let base_url = match call.host {
            Host::Api => self.config.base_url(),
            Host::Payments => self.config.payments_base_url(),
        };
        let url = format!("{}{}", base_url.trim_end_matches('/'), call.path);

        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .header(CONTENT_TYPE, call.encoding.content_type())
            .header(ACCEPT, "application/json");

        if call.requires_auth {
            let token = self.current_token().ok_or_else(|| {
                CoraError::transport("access token not set, authenticate first", None)
            })?;
            request = request.bearer_auth(token);
        }

        if call.idempotency.applies_to(&call.method) {
            request = request.header(IDEMPOTENCY_KEY_HEADER, Uuid::new_v4().to_string());
        }

        if let Some(payload) = call.payload {
            let body = match call.encoding {
                BodyEncoding::Json => serde_json::to_vec(payload).map_err(|e| {
                    CoraError::transport(format!("failed to encode JSON body: {}", e), Some(Box::new(e)))
                })?,
                BodyEncoding::Form => encode_form(payload)?.into_bytes(),
            };
            request = request.body(body);
        }

        let start = Instant::now();
        debug!(method = %call.method, %url, "sending Cora API request");

        let http_response = request.send().map_err(|e| {
            debug!(method = %call.method, %url, error = %e, "Cora API request failed");
            CoraError::from(e)
        })?;
        let status = http_response.status().as_u16();
        let bytes = http_response.bytes()?;

        debug!(
            method = %call.method,
            %url,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "received Cora API response"
        );

        let body = if bytes.is_empty() {
            None
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Some(value),
                // status >= 400 with a non-JSON body (e.g. a gateway HTML page)
                // is reported as Api with no body, not as Transport
                Err(_) if status >= 400 => None,
                Err(e) => return Err(e.into()),
            }
        };

        if status >= 400 {
            return Err(CoraError::api(status, body));
        }

        Ok(Response::new(status, body))
    }

    fn current_token(&self) -> Option<String> {
        self.lock_token().as_ref().map(|t| t.value().to_string())
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<AccessToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_json<P: Serialize>(payload: &P) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| {
        CoraError::transport(format!("failed to encode JSON body: {}", e), Some(Box::new(e)))
    })
}

/// Encode a JSON object as `application/x-www-form-urlencoded`.
///
/// Nested objects and arrays use bracket notation (`a[b]=1`, `a[0]=x`),
/// booleans become `1`/`0` and nulls are skipped. Keys are emitted in
/// sorted order.
pub(crate) fn encode_form(payload: &Value) -> Result<String> {
    let map = payload
        .as_object()
        .ok_or_else(|| CoraError::transport("form body must be a JSON object", None))?;

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in sorted_entries(map) {
        append_form_pair(&mut serializer, key, value);
    }
    Ok(serializer.finish())
}

fn sorted_entries(map: &serde_json::Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn append_form_pair<T: form_urlencoded::Target>(
    serializer: &mut form_urlencoded::Serializer<'_, T>,
    key: &str,
    value: &Value,
) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            serializer.append_pair(key, if *b { "1" } else { "0" });
        }
        Value::Number(n) => {
            serializer.append_pair(key, &n.to_string());
        }
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                append_form_pair(serializer, &format!("{}[{}]", key, i), item);
            }
        }
        Value::Object(map) => {
            for (k, v) in sorted_entries(map) {
                append_form_pair(serializer, &format!("{}[{}]", key, k), v);
            }
        }
    }
}
