use std::time::Duration;

use futures_util::FutureExt;
use log::debug;
use serde_json::Value;

use dashboard_frontend::connection::{collection_url, FetchFuture};
use dashboard_frontend::{FetchCollection, FetchError, ParentFilter};

use crate::config::Config;
use crate::ShellError;

/// Fetches collections over HTTP. Every request is bounded by a timeout and
/// network failures are retried up to `request_attempts` times in total.
#[derive(Clone, Debug)]
pub struct HttpFetch {
    base_url: String,
    timeout: Duration,
    request_attempts: usize,
    http: reqwest::Client,
}

impl HttpFetch {
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| ShellError::HttpClient(err.to_string()))?;

        Ok(HttpFetch {
            base_url: config.api_base.trim().trim_end_matches('/').to_owned(),
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            request_attempts: config.request_attempts.max(1),
            http,
        })
    }

    pub fn endpoint(&self, resource: &str, filter: Option<ParentFilter>) -> String {
        collection_url(&self.base_url, resource, filter)
    }
}

impl FetchCollection for HttpFetch {
    fn fetch_collection(&self, resource: &str, filter: Option<ParentFilter>) -> FetchFuture {
        let url = self.endpoint(resource, filter);
        let http = self.http.clone();
        let timeout = self.timeout;
        let attempts = self.request_attempts;

        async move { get_json(&http, &url, timeout, attempts).await }.boxed_local()
    }
}

async fn get_json(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
    attempts: usize,
) -> Result<Value, FetchError> {
    let mut last_error: Option<String> = None;

    for attempt in 0..attempts {
        match http.get(url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }
                return response
                    .json::<Value>()
                    .await
                    .map_err(|err| FetchError::Decode(err.to_string()));
            }
            Err(error) => {
                debug!("GET {} attempt {} failed: {}", url, attempt + 1, error);
                last_error = Some(error.to_string());
            }
        }
    }

    Err(FetchError::Network(
        last_error.unwrap_or_else(|| "unknown".to_owned()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_the_configured_base() {
        let config = Config {
            api_base: "http://localhost:3000/ ".into(),
            ..Config::default()
        };
        let fetch = HttpFetch::new(&config).unwrap();

        assert_eq!(fetch.endpoint("users", None), "http://localhost:3000/users");
        assert_eq!(
            fetch.endpoint("comments", Some(ParentFilter::post(12))),
            "http://localhost:3000/comments?postId=12"
        );
    }

    #[test]
    fn at_least_one_attempt_is_made() {
        let config = Config {
            request_attempts: 0,
            timeout_ms: 1,
            ..Config::default()
        };
        let fetch = HttpFetch::new(&config).unwrap();

        assert_eq!(fetch.request_attempts, 1);
        assert_eq!(fetch.timeout, Duration::from_millis(250));
    }
}
