//! HTTP transport boundary.
//!
//! The request pipeline talks to the network only through the [`Transport`]
//! trait, which performs a single request and reports either a JSON payload
//! or a [`TransportError`] distinguishing "no response" from "HTTP status
//! with body". [`HttpTransport`] is the reqwest-backed implementation used by
//! [`VoeClient`](super::VoeClient); tests substitute their own.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::config::ClientConfig;
use super::constants::API_KEY_PARAM;
use super::error::{ApiError, TransportError};
use super::validation::{Params, Schema};

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// An opaque file body sent as the `file` part of a multipart form.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name announced to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Description of one API call, consumed once by the pipeline.
///
/// `endpoint` is either a path relative to the configured base URL or an
/// absolute URL (upload servers live on other hosts).
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    method: Method,
    endpoint: String,
    params: Value,
    schema: Option<&'static Schema>,
    upload: Option<Upload>,
}

impl Operation {
    /// Creates a `GET` operation without parameters.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    /// Creates a `POST` operation without parameters.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: Value::Null,
            schema: None,
            upload: None,
        }
    }

    /// Sets the parameter object, checked against `schema` before dispatch.
    #[must_use]
    pub fn with_params(mut self, schema: &'static Schema, params: Value) -> Self {
        self.schema = Some(schema);
        self.params = params;
        self
    }

    /// Sets a parameter object that is sent without validation.
    #[must_use]
    pub fn with_unchecked_params(mut self, params: Value) -> Self {
        self.schema = None;
        self.params = params;
        self
    }

    /// Attaches a multipart file body.
    #[must_use]
    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the endpoint path or absolute URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the raw parameter object.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Returns the schema parameters are checked against, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&'static Schema> {
        self.schema
    }

    /// Returns whether parameters are validated before dispatch.
    #[must_use]
    pub fn requires_validation(&self) -> bool {
        self.schema.is_some()
    }

    /// Returns the attached upload, if any.
    #[must_use]
    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }
}

/// A validated request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL.
    pub endpoint: String,
    /// Query parameters (the API key is added by the transport).
    pub query: Params,
    /// Optional multipart body.
    pub upload: Option<Upload>,
}

/// Performs single HTTP requests for the pipeline.
///
/// Implementations must not retry or rate limit; the pipeline does both.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` and returns the decoded JSON body of a 2xx response.
    ///
    /// An empty 2xx body is returned as [`Value::Null`].
    async fn send(&self, request: &Request) -> Result<Value, TransportError>;
}

/// reqwest-backed [`Transport`].
///
/// Attaches the API key as the `key` query parameter of every request.
/// Created once per client and reused, taking advantage of connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a transport for `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`Network`](super::ErrorKind::Network) error when the HTTP
    /// client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = build_client(config.timeout())
            .map_err(|e| ApiError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    /// Resolves the request URL and appends the API key and query parameters.
    fn request_url(&self, request: &Request) -> Result<Url, TransportError> {
        let mut url = match Url::parse(&request.endpoint) {
            Ok(absolute) => absolute,
            Err(_) => {
                // Plain concatenation keeps the base URL's path prefix (`/api`).
                let joined = format!("{}{}", self.base_url, request.endpoint);
                Url::parse(&joined).map_err(|e| {
                    TransportError::no_response(format!("invalid request URL {joined}: {e}"))
                })?
            }
        };

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(API_KEY_PARAM, &self.api_key);
            for (key, value) in request.query.iter() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, endpoint = %request.endpoint)
    )]
    async fn send(&self, request: &Request) -> Result<Value, TransportError> {
        let url = self.request_url(request)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(upload) = &request.upload {
            let part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
            builder = builder.multipart(Form::new().part("file", part));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::no_response(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::no_response(e.to_string()))?;
        debug!(status, bytes = text.len(), "response received");

        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                status,
                body: parse_error_body(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            status,
            message: e.to_string(),
        })
    }
}

fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(default_user_agent())
        .gzip(true)
        .build()
}

/// User-Agent identifying this client.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("voe-client/{version}")
}

/// Keeps the raw error payload: JSON when it parses, text otherwise.
fn parse_error_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        let config = ClientConfig::builder("secret-key")
            .base_url(base_url)
            .build()
            .unwrap();
        HttpTransport::new(&config).unwrap()
    }

    fn request(endpoint: &str, query: Params) -> Request {
        Request {
            method: Method::Get,
            endpoint: endpoint.to_string(),
            query,
            upload: None,
        }
    }

    #[test]
    fn test_request_url_keeps_base_path_and_appends_key() {
        let url = transport("https://voe.sx/api")
            .request_url(&request("/file/info", Params::new()))
            .unwrap();
        assert_eq!(url.as_str(), "https://voe.sx/api/file/info?key=secret-key");
    }

    #[test]
    fn test_request_url_appends_params_after_key() {
        let mut query = Params::new();
        query.push("file_code", "abc,def");
        query.push("fld_id", "0");
        let url = transport("https://voe.sx/api")
            .request_url(&request("/file/clone", query))
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("key".to_string(), "secret-key".to_string()),
                ("file_code".to_string(), "abc,def".to_string()),
                ("fld_id".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_absolute_endpoint_overrides_base() {
        let url = transport("https://voe.sx/api")
            .request_url(&request("https://delivery-node-1.voe.sx/upload", Params::new()))
            .unwrap();
        assert_eq!(url.host_str(), Some("delivery-node-1.voe.sx"));
        assert_eq!(url.path(), "/upload");
        assert!(url.query().unwrap().contains("key=secret-key"));
    }

    #[test]
    fn test_parse_error_body_json_text_and_empty() {
        assert_eq!(parse_error_body(r#"{"msg":"bad"}"#), Some(json!({"msg": "bad"})));
        assert_eq!(
            parse_error_body("<html>oops</html>"),
            Some(Value::String("<html>oops</html>".to_string()))
        );
        assert_eq!(parse_error_body("  "), None);
    }

    #[test]
    fn test_operation_builder() {
        let op = Operation::get("/folder/list").with_params(
            &crate::api::validation::FOLDER_LIST,
            json!({"fld_id": 3}),
        );
        assert_eq!(op.method(), Method::Get);
        assert_eq!(op.endpoint(), "/folder/list");
        assert!(op.requires_validation());
        assert!(op.upload().is_none());
    }

    #[test]
    fn test_upload_debug_omits_bytes() {
        let upload = Upload {
            file_name: "clip.mp4".to_string(),
            bytes: vec![1, 2, 3],
        };
        let rendered = format!("{upload:?}");
        assert!(rendered.contains("clip.mp4"));
        assert!(rendered.contains("len: 3"));
    }

    #[test]
    fn test_default_user_agent_has_version() {
        assert!(default_user_agent().starts_with("voe-client/"));
    }
}
