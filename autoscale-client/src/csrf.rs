//! CSRF token sources

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;

/// Name of the CSRF cookie and of the body field that echoes it
pub const XSRF_FIELD: &str = "_xsrf";

/// Produces the current CSRF token for mutating requests
pub trait CsrfTokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token, e.g. from configuration
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CsrfTokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Reads the `_xsrf` cookie from a reqwest cookie jar
#[derive(Debug, Clone)]
pub struct CookieTokenSource {
    jar: Arc<Jar>,
    url: Url,
}

impl CookieTokenSource {
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CsrfTokenSource for CookieTokenSource {
    fn token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, XSRF_FIELD).map(String::from)
    }
}

/// Look up `name` in a `Cookie` header value (`a=1; b=2`)
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}
