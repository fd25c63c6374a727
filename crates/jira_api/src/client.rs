use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{Issue, SearchPage};

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    pacer: RequestPacer,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let pacer = RequestPacer::new(config.cooldown);
        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Fetches every issue matching `jql`, changelog included, by walking the
    /// paged search endpoint until the reported total is reached.
    ///
    /// `startAt` advances by the number of issues actually returned, so short
    /// final pages terminate cleanly. A zero-length page while issues are
    /// still outstanding is a malformed response, not a stop condition.
    pub async fn search_all(&self, jql: &str, page_size: u32) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut start_at = 0usize;
        loop {
            let page = self.fetch_page(jql, start_at, page_size).await?;
            let total = page.total;
            let returned = page.issues.len();
            debug!(start_at, total, returned, "fetched search page");
            if returned == 0 {
                if start_at >= total {
                    break;
                }
                return Err(JiraError::Malformed(format!(
                    "empty page at offset {start_at} while the server reports {total} matches"
                )));
            }
            issues.extend(page.issues);
            start_at += returned;
            if start_at >= total {
                break;
            }
        }
        Ok(issues)
    }

    /// Requests one page, retrying transient transport failures within the
    /// configured budget.
    async fn fetch_page(&self, jql: &str, start_at: usize, page_size: u32) -> Result<SearchPage> {
        with_retries(self.config.retry_attempts, self.config.retry_backoff, || {
            self.request_page(jql, start_at, page_size)
        })
        .await
    }

    async fn request_page(&self, jql: &str, start_at: usize, page_size: u32) -> Result<SearchPage> {
        self.pacer.pause().await;
        let start_at = start_at.to_string();
        let max_results = page_size.to_string();
        let response = self
            .http
            .get(self.config.search_url())
            .query(&[
                ("jql", jql),
                ("expand", "changelog"),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::http(status, body))
        }
    }
}

/// Runs `operation` up to `attempts` times, sleeping `backoff` between tries.
/// Only transient transport failures are retried; everything else surfaces
/// immediately.
async fn with_retries<T, F, Fut>(attempts: u32, backoff: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!(%err, attempt, "transient request failure, retrying");
                attempt += 1;
                sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let credentials = BASE64_STANDARD.encode(format!("{}:{}", config.email, config.api_token));
    headers.insert(AUTHORIZATION, header_value(format!("Basic {credentials}"))?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

/// Enforces a minimum delay between consecutive requests so report runs stay
/// inside instance rate limits.
#[derive(Clone, Debug)]
struct RequestPacer {
    cooldown: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits out the remaining cooldown, then records the current call.
    async fn pause(&self) {
        let mut guard = self.last_call.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                sleep(self.cooldown - elapsed).await;
            }
        }
        *guard = Some(Instant::now());
    }
}
