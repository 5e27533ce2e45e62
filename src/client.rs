//! HTTP plumbing for the catalog backend.
//!
//! One call, one round trip: no retries, no caching, no shared state besides
//! the session store, which is read before every authenticated request.

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `method path` against the base URL.
    ///
    /// Returns `None` for 204 (or any empty 2xx body), otherwise the parsed
    /// JSON body untouched. `body` is dropped for methods that carry none.
    pub async fn request<B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
        auth_required: bool,
    ) -> Result<Option<Value>>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if auth_required {
            let token = self
                .session
                .token()
                .filter(|t| !t.is_empty())
                .ok_or(ClientError::AuthRequired)?;
            req = req.bearer_auth(token);
        }

        if let Some(body) = body {
            if carries_body(&method) {
                req = req.json(body);
            } else {
                debug!(%method, path, "Dropping request body for bodiless method");
            }
        }

        debug!(%method, path, auth_required, "Sending request");
        let res = req.send().await.map_err(|e| {
            warn!(%method, path, "Request failed before a response: {e}");
            ClientError::Network(e)
        })?;

        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let message = error_message(status, &bytes);
            warn!(%method, path, status = status.as_u16(), "API error: {message}");
            return Err(ClientError::Api { status, message });
        }

        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// GET a typed body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth_required: bool) -> Result<T> {
        let value = self.request::<Value>(path, Method::GET, None, auth_required).await?;
        decode(value)
    }

    /// Send a JSON body and decode a typed response.
    pub async fn send<B, T>(&self, method: Method, path: &str, body: &B, auth_required: bool) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.request(path, method, Some(body), auth_required).await?;
        decode(value)
    }

    /// Bodiless call whose response, if any, is returned raw.
    pub async fn call(&self, method: Method, path: &str, auth_required: bool) -> Result<Option<Value>> {
        self.request::<Value>(path, method, None, auth_required).await
    }
}

fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS)
}

// A missing body decodes as JSON null, so `Option<T>` targets accept 204.
fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<T> {
    Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
}

/// `message` from a JSON error body, else a generic line with the status.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("request failed: {status}"))
}
