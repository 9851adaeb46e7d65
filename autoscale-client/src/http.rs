//! HTTP transport for the autoscaling console endpoints

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;
use shared::FormBody;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::csrf::CookieTokenSource;
use crate::{ClientError, ClientResult, SyncConfig};

/// Autoscaling action invoked through the console proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateLaunchConfiguration,
    DeleteLaunchConfiguration,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateLaunchConfiguration => "CreateLaunchConfiguration",
            Action::DeleteLaunchConfiguration => "DeleteLaunchConfiguration",
        }
    }

    /// Request path, relative to the base URL
    pub fn path(&self) -> &'static str {
        match self {
            Action::CreateLaunchConfiguration => "/autoscaling?Action=CreateLaunchConfiguration",
            Action::DeleteLaunchConfiguration => "/autoscaling?Action=DeleteLaunchConfiguration",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport abstraction for autoscaling requests
///
/// One call is one request: it resolves exactly once, with the decoded JSON
/// body on success or a [`ClientError`] on any transport-level failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(&self, action: Action, form: &FormBody) -> ClientResult<Value>;
}

/// Server error body, used to build a readable failure detail
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// reqwest-backed transport
///
/// Holds a cookie jar shared with [`CookieTokenSource`] so the `_xsrf`
/// cookie set by the console is both sent back and echoed in the body.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    client: Client,
    base_url: String,
    cookies: Arc<Jar>,
}

impl NetworkTransport {
    pub fn new(config: &SyncConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {}", base_url, e)))?;

        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookie jar used for every request
    pub fn cookie_jar(&self) -> Arc<Jar> {
        self.cookies.clone()
    }

    /// Store a `Set-Cookie` style string for the base URL
    pub fn add_cookie(&self, cookie: &str) -> ClientResult<()> {
        let url = self.url()?;
        self.cookies.add_cookie_str(cookie, &url);
        Ok(())
    }

    /// CSRF token source reading the `_xsrf` cookie from this transport's jar
    pub fn token_source(&self) -> ClientResult<CookieTokenSource> {
        Ok(CookieTokenSource::new(self.cookies.clone(), self.url()?))
    }

    fn url(&self) -> ClientResult<Url> {
        Url::parse(&self.base_url).map_err(|e| ClientError::Config(e.to_string()))
    }

    async fn handle_response(response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => api_err.message,
                Err(_) if !text.trim().is_empty() => text.trim().to_string(),
                Err(_) => status
                    .canonical_reason()
                    .map(String::from)
                    .unwrap_or_else(|| status.to_string()),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn post_form(&self, action: Action, form: &FormBody) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, action.path());
        tracing::debug!(%action, %url, fields = form.len(), "POST");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(form.pairs())
            .send()
            .await?;

        Self::handle_response(response).await
    }
}
