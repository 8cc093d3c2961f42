use crate::error::Result;
use crate::rest::CoraClient;
use serde_json::{json, Value};
use url::form_urlencoded;

const ENDPOINTS_PATH: &str = "/notifications/endpoints";

/// Webhook (notification endpoint) management
pub struct Notifications<'a> {
    client: &'a CoraClient,
}

impl CoraClient {
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications { client: self }
    }
}

impl<'a> Notifications<'a> {
    /// Register a webhook
    ///
    /// # Arguments
    /// * `url` - URL Cora will call
    /// * `resource` - Resource to watch, e.g. `INVOICE`
    /// * `trigger` - Event, e.g. `STATUS_CHANGED`
    pub fn create(&self, url: &str, resource: &str, trigger: &str) -> Result<Value> {
        let payload = json!({
            "url": url,
            "resource": resource,
            "trigger": trigger,
        });
        Ok(self.client.post(ENDPOINTS_PATH, &payload)?.into_body())
    }

    pub fn list(&self) -> Result<Value> {
        Ok(self.client.get(ENDPOINTS_PATH)?.into_body())
    }

    pub fn get(&self, endpoint_id: &str) -> Result<Value> {
        Ok(self.client.get(&endpoint_path(endpoint_id))?.into_body())
    }

    pub fn delete(&self, endpoint_id: &str) -> Result<()> {
        self.client.delete(&endpoint_path(endpoint_id))?;
        Ok(())
    }
}

fn endpoint_path(endpoint_id: &str) -> String {
    let id: String = form_urlencoded::byte_serialize(endpoint_id.as_bytes()).collect();
    format!("{}/{}", ENDPOINTS_PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_path() {
        assert_eq!(endpoint_path("end_1"), "/notifications/endpoints/end_1");
    }
}
