//! Twilio SMS notifier
//!
//! Sends through the Messages REST resource with HTTP basic auth
//! (account SID and auth token). Only the status of the reply is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::provider::Notifier;

const BASE_URL: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
}

/// Twilio client bound to one sender and one recipient
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    to_number: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            to_number: to_number.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        Self::new(
            config.credentials.twilio_account_sid.clone(),
            config.credentials.twilio_auth_token.clone(),
            config.from_number.clone(),
            config.to_number.clone(),
            config.request_timeout,
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }

    /// Build the Messages request carrying `body`
    pub fn request(&self, body: &str) -> Result<Request> {
        let request = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from_number.as_str()),
                ("To", self.to_number.as_str()),
                ("Body", body),
            ])
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl Notifier for TwilioClient {
    #[instrument(skip(self, body), fields(to = %self.to_number))]
    async fn send(&self, body: &str) -> Result<()> {
        let request = self.request(body)?;
        let response = self.client.execute(request).await.map_err(|e| {
            AlertError::SendError(format!("Twilio request failed: {}", super::redact(e)))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(super::redact)?;

        if !status.is_success() {
            return Err(AlertError::SendError(format!(
                "Twilio API error {status}: {}",
                super::error_reason(&text)
            )));
        }

        if let Ok(message) = serde_json::from_str::<MessageResource>(&text) {
            debug!(sid = ?message.sid, status = ?message.status, "message queued");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TwilioClient {
        TwilioClient::new(
            "AC123",
            "token",
            "+15005550006",
            "+11234567890",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            client().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );

        let custom = client().with_base_url("http://localhost:8080/");
        assert_eq!(
            custom.messages_url(),
            "http://localhost:8080/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_request_form_and_auth() {
        let request = client().request("TSLA: 🔺 14.3%\n").unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        // base64("AC123:token")
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Basic QUMxMjM6dG9rZW4="
        );
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );

        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        let form = std::str::from_utf8(body).unwrap();
        // Form bodies share the query string encoding
        let parsed = reqwest::Url::parse(&format!("http://localhost/?{form}")).unwrap();
        let fields: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            fields,
            vec![
                ("From".to_string(), "+15005550006".to_string()),
                ("To".to_string(), "+11234567890".to_string()),
                ("Body".to_string(), "TSLA: 🔺 14.3%\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::test_config();
        let client = TwilioClient::from_config(&config).unwrap();
        assert_eq!(client.account_sid, "AC123");
        assert_eq!(client.to_number, "+11234567890");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_send_error() {
        let client = client().with_base_url("http://127.0.0.1:9");
        let err = client.send("hello").await.unwrap_err();
        assert!(matches!(err, AlertError::SendError(_)));
    }
}
