//! # cora-sdk - Client for the Cora banking API
//!
//! A blocking Rust client for Cora's "Integração Direta" API. Every call is
//! sent over mutual TLS with the integration's client certificate,
//! authenticated with an OAuth2 client-credentials token, and given an
//! idempotency key when it mutates state.
//!
//! ## Features
//!
//! - Client-credentials token acquisition with caching and early renewal
//! - Mutual TLS using a PEM certificate and PKCS#8 key
//! - Automatic `Idempotency-Key` on POST/PUT/PATCH, overridable per request
//! - Typed errors separating transport failures from API rejections
//! - Wrappers for invoices, bank statements, webhooks and payment initiation
//! - Pix QR-code rendering to PNG or data URI
//!
//! ## Basic Usage
//!
//! ```no_run
//! use cora_sdk::{Config, CoraClient};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("int-abc123", "/certs/cert.pem", "/certs/key.pem", "sandbox")?;
//!     let client = CoraClient::new(config)?;
//!
//!     let invoice = client.invoices().create_pix(
//!         json!({
//!             "code": "order-42",
//!             "customer": {"name": "Fulano", "document": {"identity": "12345678909", "type": "CPF"}},
//!             "services": [{"name": "Plano mensal", "amount": 4990}],
//!             "payment_terms": {"due_date": "2025-12-10"}
//!         })
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//!     )?;
//!
//!     println!("created invoice {}", invoice["id"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration from the environment
//!
//! `CoraClient::from_env()` reads `CORA_CLIENT_ID`, `CORA_CERT_PATH`,
//! `CORA_KEY_PATH` and `CORA_ENV` (`sandbox` or `production`, defaults to
//! `sandbox`).
//!
//! ## Error handling
//!
//! ```no_run
//! use cora_sdk::{CoraClient, CoraError};
//!
//! # fn run(client: &CoraClient) {
//! match client.invoices().cancel("inv_123") {
//!     Ok(()) => println!("cancelled"),
//!     Err(CoraError::Api { status: 422, body, .. }) => println!("already paid: {:?}", body),
//!     Err(e) => eprintln!("cancel failed: {}", e),
//! }
//! # }
//! ```

pub mod client;
pub mod error;
pub mod invoice;
pub mod notification;
pub mod payment;
pub mod pix_qr;
pub mod response;
pub mod rest;
pub mod statement;
pub mod time;
pub mod token;

// Re-export main types for convenience
pub use client::{Config, Environment};
pub use error::{CoraError, Result};
pub use invoice::Invoices;
pub use notification::Notifications;
pub use payment::{BoletoPayment, Payments};
pub use pix_qr::PixQrCode;
pub use response::Response;
pub use rest::{BodyEncoding, CoraClient, Host, Idempotency, IDEMPOTENCY_KEY_HEADER};
pub use statement::BankStatement;
pub use time::Date;
pub use token::{AccessToken, TokenResponseError};

// Re-export for building requests without a direct dependency
pub use reqwest::Method;
pub use serde_json::json;
