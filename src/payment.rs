use crate::error::Result;
use crate::rest::{CoraClient, Host, Idempotency};
use crate::time::Date;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

const INITIATE_PATH: &str = "/payments/initiate";

/// Body of a boleto payment initiation
#[derive(Debug, Clone, Serialize)]
pub struct BoletoPayment<'a> {
    /// Caller-side identifier of the operation
    pub code: &'a str,
    /// Boleto digitable line
    pub digitable_line: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Date>,
}

/// Payment initiation, served by the payments host
pub struct Payments<'a> {
    client: &'a CoraClient,
}

impl CoraClient {
    pub fn payments(&self) -> Payments<'_> {
        Payments { client: self }
    }
}

impl<'a> Payments<'a> {
    /// Start paying a boleto. Without `scheduled_at` the API pays it as soon as possible.
    pub fn initiate_boleto(
        &self,
        code: &str,
        digitable_line: &str,
        scheduled_at: Option<Date>,
    ) -> Result<Value> {
        let payload = serde_json::to_value(BoletoPayment {
            code,
            digitable_line,
            scheduled_at,
        })?;

        let response = self.client.request_at(
            Host::Payments,
            Method::POST,
            INITIATE_PATH,
            Some(&payload),
            Idempotency::Always,
        )?;
        Ok(response.into_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boleto_payment_body() {
        let body = serde_json::to_value(BoletoPayment {
            code: "pay-1",
            digitable_line: "34191790010104351004791020150008291070026000",
            scheduled_at: Date::from_ymd(2025, 2, 10),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "code": "pay-1",
                "digitable_line": "34191790010104351004791020150008291070026000",
                "scheduled_at": "2025-02-10",
            })
        );
    }

    #[test]
    fn test_boleto_payment_without_schedule() {
        let body = serde_json::to_value(BoletoPayment {
            code: "pay-1",
            digitable_line: "123",
            scheduled_at: None,
        })
        .unwrap();
        assert!(body.get("scheduled_at").is_none());
    }
}
