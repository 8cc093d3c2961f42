#![allow(dead_code)]

use cora_sdk::{Config, CoraClient};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CLIENT_ID: &str = "int-test-123";
pub const TOKEN: &str = "tok-abc";

/// A wiremock server driven from synchronous tests.
///
/// The blocking client must not run inside an async context, so tests stay
/// synchronous and only the mock setup goes through the runtime.
pub struct Harness {
    pub server: MockServer,
    pub rt: Runtime,
}

impl Harness {
    pub fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let rt = Runtime::new().expect("failed to start tokio runtime");
        let server = rt.block_on(MockServer::start());
        Harness { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Mount a token endpoint answering with `expires_in` seconds of validity
    pub fn mount_token(&self, expires_in: i64) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": TOKEN,
                    "token_type": "Bearer",
                    "expires_in": expires_in,
                }))),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }

    pub fn config(&self) -> Config {
        Config::sandbox(CLIENT_ID, "unused-cert.pem", "unused-key.pem")
            .with_base_url(self.uri())
            .with_payments_base_url(self.uri())
    }

    pub fn client(&self) -> CoraClient {
        CoraClient::with_http_client(self.config(), reqwest::blocking::Client::new())
    }
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body is not JSON")
}
