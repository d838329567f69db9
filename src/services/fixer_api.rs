use axum::http::StatusCode;
use serde_json::Value;

use crate::models::{FixerRecord, JobOffer};

#[derive(Debug, Clone)]
pub struct FixerApiError {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl FixerApiError {
    fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }
}

fn fixer_api_connect_base_url() -> String {
    // Dev setups route everything through a single local ingress on 127.0.0.1:8080,
    // and use the Host header to select the service (auth.localhost, fixerapi.localhost).
    std::env::var("FIXER_API_CONNECT_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

fn fixer_api_host_header() -> String {
    std::env::var("FIXER_API_HOST").unwrap_or_else(|_| "fixerapi.localhost".to_string())
}

fn connect_failed(url: &str, err: impl ToString) -> FixerApiError {
    FixerApiError::new(
        StatusCode::BAD_GATEWAY,
        Some(serde_json::json!({
            "error": "connect_failed",
            "detail": err.to_string(),
            "url": url
        })),
    )
}

/// Client for the marketplace data api. The base url is held on the struct
/// (instead of read per call) so tests can point it at a local stub.
#[derive(Debug, Clone)]
pub struct FixerApi {
    client: reqwest::Client,
    base_url: String,
    host_header: String,
}

impl FixerApi {
    pub fn from_env() -> Self {
        Self::new(fixer_api_connect_base_url(), fixer_api_host_header())
    }

    pub fn new(base_url: String, host_header: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            host_header,
        }
    }

    /// Fetch a fixer's account + marketplace profile. A 404 from the api is
    /// not an error here; the caller decides how to render an unknown fixer.
    pub async fn get_fixer_by_id(
        &self,
        fixer_id: &str,
    ) -> Result<Option<FixerRecord>, FixerApiError> {
        let url = format!(
            "{}/api/v1/fixers/{}",
            self.base_url.trim_end_matches('/'),
            fixer_id
        );

        let resp = self
            .client
            .get(&url)
            .header("Host", &self.host_header)
            .send()
            .await
            .map_err(|e| connect_failed(&url, e))?;

        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.json::<Value>().await.ok();
            return Err(FixerApiError::new(status, body));
        }

        let record: FixerRecord = resp.json().await.map_err(|e| connect_failed(&url, e))?;
        Ok(Some(record))
    }

    pub async fn get_jobs_by_fixer(&self, fixer_id: &str) -> Result<Vec<JobOffer>, FixerApiError> {
        let url = format!(
            "{}/api/v1/fixers/{}/jobs",
            self.base_url.trim_end_matches('/'),
            fixer_id
        );

        let resp = self
            .client
            .get(&url)
            .header("Host", &self.host_header)
            .send()
            .await
            .map_err(|e| connect_failed(&url, e))?;

        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            let body = resp.json::<Value>().await.ok();
            return Err(FixerApiError::new(status, body));
        }

        let jobs: Vec<JobOffer> = resp.json().await.map_err(|e| connect_failed(&url, e))?;
        Ok(jobs)
    }
}
