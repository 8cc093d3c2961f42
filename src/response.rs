use serde_json::Value;

/// Response is the outcome of a successful (status < 400) API call:
/// the HTTP status and the decoded JSON body, if the server sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body, `None` when the body was empty
    pub body: Option<Value>,
}

impl Response {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Response { status, body }
    }

    /// Get the raw body value from the response
    pub fn raw(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Consume the response, returning the body or an empty object when there was none
    pub fn into_body(self) -> Value {
        self.body
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// Apply unmarshals the response body into the provided type
    pub fn apply<T>(&self) -> Result<T, crate::error::CoraError>
    where
        T: serde::de::DeserializeOwned,
    {
        match &self.body {
            Some(body) => serde_json::from_value(body.clone()).map_err(|e| e.into()),
            None => serde_json::from_value(Value::Null).map_err(|e| e.into()),
        }
    }

    /// Get a value from the response body by a slash-separated path.
    /// For example, "items/0/id" would access the "id" field of the first item.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut current = self.body.as_ref()?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the response body by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_response_get() {
        let response = Response::new(
            200,
            Some(json!({"items": [{"id": "inv_1", "status": "OPEN"}]})),
        );
        assert_eq!(response.get_string("items/0/id"), Some("inv_1".to_string()));
        assert!(response.get("items/1").is_none());
        assert!(response.get("items/x").is_none());
    }

    #[test]
    fn test_response_apply() {
        #[derive(Deserialize)]
        struct Invoice {
            id: String,
            total_amount: i64,
        }

        let response = Response::new(201, Some(json!({"id": "inv_1", "total_amount": 1500})));
        let invoice: Invoice = response.apply().unwrap();
        assert_eq!(invoice.id, "inv_1");
        assert_eq!(invoice.total_amount, 1500);
    }

    #[test]
    fn test_into_body_empty() {
        let response = Response::new(204, None);
        assert_eq!(response.into_body(), json!({}));
    }
}
