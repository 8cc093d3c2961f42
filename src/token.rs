use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Tokens are considered expired this many seconds before the server says so
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Reason a token endpoint response could not be turned into an [`AccessToken`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenResponseError {
    MissingAccessToken,
    ExpiryOutOfRange(i64),
}

impl std::fmt::Display for TokenResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenResponseError::MissingAccessToken => {
                f.write_str("access_token not found in token response")
            }
            TokenResponseError::ExpiryOutOfRange(secs) => {
                write!(f, "expires_in out of range in token response: {}", secs)
            }
        }
    }
}

/// AccessToken is a Bearer token obtained through the client-credentials grant,
/// together with the instant after which it must no longer be used.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token valid for `expires_in` seconds from `now`, minus the safety margin.
    ///
    /// Returns `None` when the resulting instant cannot be represented.
    pub fn new(value: String, expires_in: i64, now: DateTime<Utc>) -> Option<Self> {
        let lifetime = expires_in.checked_sub(EXPIRY_MARGIN_SECS)?;
        let expires_at = now.checked_add_signed(TimeDelta::try_seconds(lifetime)?)?;
        Some(AccessToken { value, expires_at })
    }

    /// Extract a token from a decoded token endpoint response.
    ///
    /// `expires_in` defaults to [`DEFAULT_EXPIRES_IN`] when absent or null. A
    /// value that is present but not an integer counts as 0, so the token is
    /// renewed on the next call.
    pub fn from_response(body: &Value, now: DateTime<Utc>) -> Result<Self, TokenResponseError> {
        let value = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or(TokenResponseError::MissingAccessToken)?
            .to_string();

        let expires_in = match body.get("expires_in") {
            None | Some(Value::Null) => DEFAULT_EXPIRES_IN,
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(_) => 0,
        };

        AccessToken::new(value, expires_in, now).ok_or(TokenResponseError::ExpiryOutOfRange(expires_in))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check whether the token can still be used at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// Keep the bearer value out of logs
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> TimeDelta {
        TimeDelta::try_seconds(n).unwrap()
    }

    #[test]
    fn test_token_expiry_margin() {
        let token = AccessToken::new("abc".to_string(), 3600, now()).unwrap();
        assert_eq!(token.expires_at(), now() + secs(3540));
        assert!(token.is_valid_at(now()));
        assert!(token.is_valid_at(now() + secs(3539)));
        assert!(!token.is_valid_at(now() + secs(3540)));
    }

    #[test]
    fn test_from_response_defaults_expiry() {
        let token = AccessToken::from_response(&json!({"access_token": "abc"}), now()).unwrap();
        assert_eq!(token.value(), "abc");
        assert_eq!(
            token.expires_at(),
            now() + secs(DEFAULT_EXPIRES_IN - EXPIRY_MARGIN_SECS)
        );

        let body = json!({"access_token": "abc", "expires_in": null});
        let token = AccessToken::from_response(&body, now()).unwrap();
        assert_eq!(token.expires_at(), now() + secs(DEFAULT_EXPIRES_IN - EXPIRY_MARGIN_SECS));
    }

    #[test]
    fn test_from_response_string_expiry() {
        let body = json!({"access_token": "abc", "expires_in": "120"});
        let token = AccessToken::from_response(&body, now()).unwrap();
        assert_eq!(token.expires_at(), now() + secs(60));
    }

    #[test]
    fn test_from_response_unparseable_expiry_renews() {
        for expires_in in [json!("soon"), json!(true), json!({"s": 10})] {
            let body = json!({"access_token": "abc", "expires_in": expires_in});
            let token = AccessToken::from_response(&body, now()).unwrap();
            assert_eq!(token.expires_at(), now() - secs(EXPIRY_MARGIN_SECS));
            assert!(!token.is_valid_at(now()));
        }
    }

    #[test]
    fn test_from_response_extreme_expiry() {
        let body = json!({"access_token": "t", "expires_in": i64::MAX});
        assert_eq!(
            AccessToken::from_response(&body, now()).unwrap_err(),
            TokenResponseError::ExpiryOutOfRange(i64::MAX)
        );

        let body = json!({"access_token": "t", "expires_in": -i64::MAX});
        assert_eq!(
            AccessToken::from_response(&body, now()).unwrap_err(),
            TokenResponseError::ExpiryOutOfRange(-i64::MAX)
        );

        assert!(AccessToken::new("t".to_string(), i64::MIN, now()).is_none());
    }

    #[test]
    fn test_from_response_without_token() {
        assert_eq!(
            AccessToken::from_response(&json!({"error": "invalid_client"}), now()).unwrap_err(),
            TokenResponseError::MissingAccessToken
        );
        assert!(AccessToken::from_response(&Value::Null, now()).is_err());
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::new("secret-token".to_string(), 3600, now()).unwrap();
        assert!(!format!("{:?}", token).contains("secret-token"));
    }
}
