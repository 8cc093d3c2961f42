use crate::error::{CoraError, Result};
use crate::rest::CoraClient;
use serde::Serialize;
use serde_json::{json, Map, Value};
use url::form_urlencoded;

const INVOICES_PATH: &str = "/v2/invoices";
const INVOICES_PAY_PATH: &str = "/v2/invoices/pay";

/// Payment form sent for boleto invoices
pub const PAYMENT_FORM_BANK_SLIP: &str = "BANK_SLIP";
/// Payment form sent for Pix invoices
pub const PAYMENT_FORM_PIX: &str = "PIX";

/// Invoice (boleto / Pix charge) endpoints
pub struct Invoices<'a> {
    client: &'a CoraClient,
}

impl CoraClient {
    pub fn invoices(&self) -> Invoices<'_> {
        Invoices { client: self }
    }
}

impl<'a> Invoices<'a> {
    /// Create an invoice; the payload decides whether it is a boleto, Pix or both
    pub fn create<P: Serialize>(&self, payload: &P) -> Result<Value> {
        Ok(self.client.post(INVOICES_PATH, payload)?.into_body())
    }

    /// Create a boleto invoice. `payment_forms` is always `["BANK_SLIP"]`,
    /// whatever the caller put there.
    pub fn create_boleto(&self, payload: Map<String, Value>) -> Result<Value> {
        self.create(&with_payment_form(payload, PAYMENT_FORM_BANK_SLIP))
    }

    /// Create a Pix invoice. `payment_forms` is always `["PIX"]`.
    pub fn create_pix(&self, payload: Map<String, Value>) -> Result<Value> {
        self.create(&with_payment_form(payload, PAYMENT_FORM_PIX))
    }

    pub fn get(&self, invoice_id: &str) -> Result<Value> {
        Ok(self.client.get(&invoice_path(invoice_id))?.into_body())
    }

    /// List invoices, optionally filtered.
    ///
    /// ```no_run
    /// # fn run(client: &cora_sdk::CoraClient) -> cora_sdk::Result<()> {
    /// let paid = client
    ///     .invoices()
    ///     .list([("state", "PAID"), ("start", "2025-11-01"), ("end", "2025-11-30")])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn list<I, K, V>(&self, query: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in query {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }
        let query = serializer.finish();

        let path = if query.is_empty() {
            INVOICES_PATH.to_string()
        } else {
            format!("{}?{}", INVOICES_PATH, query)
        };

        Ok(self.client.get(&path)?.into_body())
    }

    /// Pay a boleto or Pix invoice. Only available in the sandbox environment.
    pub fn pay_in_stage(&self, invoice_id: &str) -> Result<Value> {
        let payload = json!({ "id": invoice_id });
        Ok(self.client.post(INVOICES_PAY_PATH, &payload)?.into_body())
    }

    /// Cancel an invoice.
    ///
    /// Succeeds only on HTTP 204. Any other outcome, including the 422 the
    /// API returns for invoices that are already paid, is reported as
    /// [`CoraError::Api`] carrying the original status and body.
    pub fn cancel(&self, invoice_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(&invoice_path(invoice_id))
            .map_err(|e| match e {
                CoraError::Api { status, body, .. } => cancel_error(invoice_id, status, body),
                other => other,
            })?;

        if response.status == 204 {
            return Ok(());
        }

        Err(cancel_error(invoice_id, response.status, response.body))
    }
}

fn invoice_path(invoice_id: &str) -> String {
    let id: String = form_urlencoded::byte_serialize(invoice_id.as_bytes()).collect();
    format!("{}/{}", INVOICES_PATH, id)
}

fn with_payment_form(mut payload: Map<String, Value>, form: &str) -> Map<String, Value> {
    payload.insert("payment_forms".to_string(), json!([form]));
    payload
}

fn cancel_error(invoice_id: &str, status: u16, body: Option<Value>) -> CoraError {
    CoraError::Api {
        message: format!("failed to cancel invoice {} (status {})", invoice_id, status),
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_form_overrides_caller() {
        let mut payload = Map::new();
        payload.insert("code".to_string(), json!("order-1"));
        payload.insert("payment_forms".to_string(), json!(["PIX"]));

        let payload = with_payment_form(payload, PAYMENT_FORM_BANK_SLIP);
        assert_eq!(payload["payment_forms"], json!(["BANK_SLIP"]));
        assert_eq!(payload["code"], json!("order-1"));
    }

    #[test]
    fn test_invoice_path_is_encoded() {
        assert_eq!(invoice_path("inv_123"), "/v2/invoices/inv_123");
        assert_eq!(invoice_path("a/b c"), "/v2/invoices/a%2Fb+c");
    }

    #[test]
    fn test_cancel_error_keeps_status_and_body() {
        let err = cancel_error("inv_1", 422, Some(json!({"code": "ALREADY_PAID"})));
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(err.response_body(), Some(&json!({"code": "ALREADY_PAID"})));
        assert!(err.to_string().contains("inv_1"));
    }
}
