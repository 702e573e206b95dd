//! Blocking HTTP transport bound to a robot identity.
//!
//! [`Transport`] is the seam the rest of the stack is written against, so
//! tests can script a remote without a network. [`HttpTransport`] is the
//! real implementation: a blocking reqwest client with the
//! `Authorization: Robot <name>` header attached to every request.

use docent_types::RobotIdentity;
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

/// Errors raised by a transport round trip.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request itself failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
}

/// GET/POST against one remote service, JSON in and JSON out.
///
/// Implementations attach whatever authentication the bound identity
/// requires; callers never see headers or URLs beyond the path.
pub trait Transport: Send + Sync {
    /// POST `body` to `path` and parse the response body as JSON.
    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError>;

    /// GET `path` and parse the response body as JSON.
    fn get(&self, path: &str) -> Result<Value, TransportError>;
}

/// [`Transport`] over a blocking [`reqwest`] client.
///
/// The base URL and authorization header are fixed at construction and
/// never change for the lifetime of the session. Whatever body the remote
/// returns is parsed as JSON regardless of HTTP status; a non-JSON body
/// (an HTML error page, an empty reply) surfaces as
/// [`TransportError::Decode`] so callers with a documented fallback can
/// take it.
pub struct HttpTransport {
    base_url: String,
    authorization: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Bind a transport to `base_url`, authenticating as `robot_name`.
    pub fn new(base_url: impl Into<String>, robot_name: &str) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("Robot {robot_name}"),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Bind a transport to the action service of `identity`.
    pub fn for_identity(identity: &RobotIdentity) -> Self {
        Self::new(identity.base_url(), &identity.name)
    }

    fn parse(&self, path: &str, body: String) -> Result<Value, TransportError> {
        serde_json::from_str(&body).map_err(|e| {
            trace!(path, "non-JSON response body");
            TransportError::Decode(e.to_string())
        })
    }
}

impl Transport for HttpTransport {
    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "POST");
        let text = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization.as_str())
            .json(body)
            .send()?
            .text()?;
        self.parse(path, text)
    }

    fn get(&self, path: &str) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "GET");
        let text = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization.as_str())
            .send()?
            .text()?;
        self.parse(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://192.168.11.1:1448/", "avatar123");
        assert_eq!(transport.base_url, "http://192.168.11.1:1448");
    }

    #[test]
    fn authorization_header_is_bound_to_the_name() {
        let transport = HttpTransport::new("http://192.168.11.1:1448", "avatar123");
        assert_eq!(transport.authorization, "Robot avatar123");
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let transport = HttpTransport::new("http://192.168.11.1:1448", "avatar123");
        let err = transport
            .parse("/api/core/slam/v1/localization/pose", "<html>busy</html>".to_string())
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
