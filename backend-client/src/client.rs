use std::time::Duration;

use async_trait::async_trait;
use rapid_select_core::OptionsTransport;
use rapid_select_core::Result;
use rapid_select_core::SelectError;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "rapid-select";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `GET`s option pages over HTTP and decodes the body as JSON.
///
/// Endpoints without a scheme are resolved against `base_url`, so a config
/// can say `endpoint = "/api/groups?q="` and point the base at a host.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Option<String>,
    bearer_token: Option<String>,
    user_agent: Option<HeaderValue>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SelectError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: None,
            bearer_token: None,
            user_agent: None,
            timeout: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = Some(base_url);
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        if let Ok(hv) = HeaderValue::from_str(&ua.into()) {
            self.user_agent = Some(hv);
        }
        self
    }

    /// Per-request deadline. Without one a request may hang until the
    /// widget cancels it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(ua) = &self.user_agent {
            h.insert(USER_AGENT, ua.clone());
        } else {
            h.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        h.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer_token
            && let Ok(hv) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            h.insert(AUTHORIZATION, hv);
        }
        h
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                if url.starts_with('/') {
                    format!("{base}{url}")
                } else {
                    format!("{base}/{url}")
                }
            }
            _ => url.to_string(),
        }
    }

    async fn exec_request(&self, url: &str) -> Result<String> {
        let mut req = self.http.get(url).headers(self.headers());
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let res = req.send().await.map_err(|e| transport_error(url, &e))?;
        let status = res.status();
        let body = res.text().await.map_err(|e| transport_error(url, &e))?;
        if !status.is_success() {
            return Err(SelectError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn transport_error(url: &str, e: &reqwest::Error) -> SelectError {
    if e.is_timeout() {
        SelectError::Transport(format!("GET {url} timed out"))
    } else {
        SelectError::Transport(format!("GET {url} failed: {e}"))
    }
}

fn decode_json(url: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| SelectError::MalformedResponse(format!("decode error for {url}: {e}")))
}

#[async_trait]
impl OptionsTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Value> {
        let url = self.resolve(url);
        debug!(%url, "GET");
        let body = self.exec_request(&url).await?;
        decode_json(&url, &body)
    }
}
