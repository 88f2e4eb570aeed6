//! Reqwest-backed Twilio relay adapter.
//!
//! This adapter owns transport details only: endpoint construction, basic
//! auth, form encoding of the message and mapping of HTTP errors.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{Relay, RelayError};
use crate::config::RelayConfig;

const USER_AGENT: &str = concat!("bloodbank/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2010-04-01";

/// Relay that creates messages through the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioRelay {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: String,
}

/// The part of a created message resource we read.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio's error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl TwilioRelay {
    /// Build a relay client for the account in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or the
    /// API base cannot carry a path.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            messages_url: messages_url(&config.api_base, &config.account_sid)?,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl Relay for TwilioRelay {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<String, RelayError> {
        debug!("POST {} (to {to})", self.messages_url);
        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }

        let created: MessageResource = serde_json::from_slice(&bytes)
            .map_err(|e| RelayError::Decode(format!("missing message sid: {e}")))?;
        Ok(created.sid)
    }
}

/// Build `{api_base}/2010-04-01/Accounts/{sid}/Messages.json`.
fn messages_url(api_base: &str, account_sid: &str) -> Result<Url, RelayError> {
    let mut url =
        Url::parse(api_base).map_err(|e| RelayError::InvalidEndpoint(format!("{api_base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| RelayError::InvalidEndpoint(format!("{api_base}: cannot carry a path")))?
        .pop_if_empty()
        .extend([API_VERSION, "Accounts", account_sid, "Messages.json"]);
    Ok(url)
}

/// Map an error response to [`RelayError::Rejected`].
fn rejection(status: StatusCode, body: &[u8]) -> RelayError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });
    RelayError::Rejected {
        status: status.as_u16(),
        code: parsed.code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP exchange on a local port and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base, handle)
    }

    fn relay_for(api_base: &str) -> TwilioRelay {
        TwilioRelay::new(&RelayConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_address: "whatsapp:+14155238886".to_string(),
            api_base: api_base.to_string(),
            ..RelayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_messages_url() {
        let url = messages_url("https://api.twilio.com", "AC123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );

        let url = messages_url("http://localhost:8080/mock/", "AC1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/mock/2010-04-01/Accounts/AC1/Messages.json"
        );
    }

    #[test]
    fn test_messages_url_invalid() {
        assert!(matches!(
            messages_url("not a url", "AC1"),
            Err(RelayError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            messages_url("mailto:ops@example.com", "AC1"),
            Err(RelayError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_rejection_with_twilio_body() {
        let body = br#"{"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}"#;
        let err = rejection(StatusCode::BAD_REQUEST, body);
        match err {
            RelayError::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(21211));
                assert_eq!(message, "Invalid 'To' Phone Number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejection_without_json_body() {
        let err = rejection(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert_eq!(
            err.to_string(),
            "relay rejected message (HTTP 502): Bad Gateway"
        );
    }

    #[tokio::test]
    async fn test_send_posts_form_and_returns_sid() {
        let (base, server) = serve_once("HTTP/1.1 201 Created", r#"{"sid": "SM42"}"#).await;
        let relay = relay_for(&base);

        let sid = relay
            .send("whatsapp:+14155238886", "whatsapp:+911234", "Need O+ blood")
            .await
            .unwrap();
        assert_eq!(sid, "SM42");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /2010-04-01/accounts/ac123/messages.json"));
        assert!(request.contains("authorization: basic "));
        assert!(request.contains("to=whatsapp%3a%2b911234"));
        assert!(request.contains("from=whatsapp%3a%2b14155238886"));
        assert!(request.contains("body=need+o%2b+blood"));
    }

    #[tokio::test]
    async fn test_send_maps_error_status() {
        let (base, server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"code": 20003, "message": "Authenticate"}"#,
        )
        .await;
        let relay = relay_for(&base);

        let err = relay.send("whatsapp:+1", "whatsapp:+2", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Rejected {
                status: 401,
                code: Some(20003),
                ..
            }
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_rejects_success_without_sid() {
        let (base, server) = serve_once("HTTP/1.1 201 Created", r#"{"status": "queued"}"#).await;
        let relay = relay_for(&base);

        let err = relay.send("whatsapp:+1", "whatsapp:+2", "hi").await.unwrap_err();
        assert!(matches!(err, RelayError::Decode(_)));
        server.await.unwrap();
    }
}
