// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3-compatible artifact store gateway.
//!
//! Talks the S3 REST protocol directly over reqwest with SigV4 signing:
//! path-style PUT/GET object, ListObjectsV2, and query-signed presigned
//! GET URLs. Works against AWS and S3-compatible stores (MinIO) via the
//! endpoint override.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use fabrica_core::{ArtifactStore, FabricaError};

use crate::sigv4::{
    Credentials, canonical_path, canonical_query_string, presign_get_url, sign_request, uri_encode,
};

/// Timeout for store HTTP calls. Model uploads can be tens of megabytes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Endpoint override for S3-compatible stores. Defaults to the
    /// regional AWS endpoint.
    pub endpoint: Option<String>,
}

/// Path-style S3 gateway.
pub struct S3Store {
    http: reqwest::Client,
    bucket: String,
    region: String,
    /// `scheme://host[:port]`, no trailing slash.
    endpoint: String,
    /// Host (with port when non-default), as signed into each request.
    host: String,
    creds: Credentials,
}

impl S3Store {
    /// Creates a gateway for one bucket.
    pub fn new(settings: S3Settings) -> Result<Self, FabricaError> {
        let endpoint = settings
            .endpoint
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", settings.region))
            .trim_end_matches('/')
            .to_string();

        let url = reqwest::Url::parse(&endpoint).map_err(|e| {
            FabricaError::Config(format!("invalid store endpoint `{endpoint}`: {e}"))
        })?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(FabricaError::Config(format!(
                    "store endpoint `{endpoint}` has no host"
                )));
            }
        };

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FabricaError::Store {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            bucket: settings.bucket,
            region: settings.region,
            endpoint,
            host,
            creds: Credentials {
                access_key_id: settings.access_key_id,
                secret_access_key: settings.secret_access_key,
            },
        })
    }

    fn object_path(&self, key: &str) -> String {
        canonical_path(&self.bucket, key)
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FabricaError> {
        let path = self.object_path(key);
        let signed = sign_request(
            &self.creds,
            &self.region,
            "PUT",
            &self.host,
            &path,
            &[],
            &bytes,
            Utc::now(),
        );

        debug!(key = %key, bytes = bytes.len(), "uploading object");

        let response = self
            .http
            .put(format!("{}{}", self.endpoint, path))
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header(reqwest::header::AUTHORIZATION, &signed.authorization)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| FabricaError::Store {
                message: format!("upload of `{key}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FabricaError::Store {
                message: format!("upload of `{key}` returned {status}: {}", s3_error_detail(&body)),
                source: None,
            });
        }

        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, FabricaError> {
        Ok(presign_get_url(
            &self.creds,
            &self.region,
            &self.endpoint,
            &self.host,
            &self.object_path(key),
            ttl.as_secs(),
            Utc::now(),
        ))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, FabricaError> {
        let path = format!("/{}", uri_encode(&self.bucket, false));
        let query = vec![
            ("list-type".to_string(), "2".to_string()),
            ("prefix".to_string(), prefix.to_string()),
        ];
        let signed = sign_request(
            &self.creds,
            &self.region,
            "GET",
            &self.host,
            &path,
            &query,
            b"",
            Utc::now(),
        );

        // The canonical query string doubles as the request's literal
        // query so the signature always matches what is sent.
        let url = format!(
            "{}{}?{}",
            self.endpoint,
            path,
            canonical_query_string(&query)
        );

        let response = self
            .http
            .get(url)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header(reqwest::header::AUTHORIZATION, &signed.authorization)
            .send()
            .await
            .map_err(|e| FabricaError::Store {
                message: format!("listing `{prefix}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(FabricaError::Store {
                message: format!("listing `{prefix}` returned {status}: {}", s3_error_detail(&body)),
                source: None,
            });
        }

        Ok(extract_keys(&body))
    }

    async fn get_json(&self, key: &str) -> Result<serde_json::Value, FabricaError> {
        let path = self.object_path(key);
        let signed = sign_request(
            &self.creds,
            &self.region,
            "GET",
            &self.host,
            &path,
            &[],
            b"",
            Utc::now(),
        );

        let response = self
            .http
            .get(format!("{}{}", self.endpoint, path))
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header(reqwest::header::AUTHORIZATION, &signed.authorization)
            .send()
            .await
            .map_err(|e| FabricaError::Store {
                message: format!("fetch of `{key}` failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FabricaError::Store {
                message: format!("fetch of `{key}` returned {status}: {}", s3_error_detail(&body)),
                source: None,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FabricaError::Store {
                message: format!("object `{key}` is not valid JSON: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

/// Extracts every `<Key>` element from a ListObjectsV2 response.
///
/// Fabrica's keys are uuid-derived and never contain XML-escaped
/// characters, so a plain scan is sufficient. Listing is single-page; the
/// pipeline never writes more than ListObjectsV2's page size per prefix
/// in any deployment this serves.
fn extract_keys(xml: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<Key>") {
        rest = &rest[start + "<Key>".len()..];
        if let Some(end) = rest.find("</Key>") {
            keys.push(rest[..end].to_string());
            rest = &rest[end + "</Key>".len()..];
        } else {
            break;
        }
    }
    keys
}

/// Renders an S3 XML error body as `Code: Message`, falling back to a
/// truncated raw body.
fn s3_error_detail(body: &str) -> String {
    let code = extract_tag(body, "Code");
    let message = extract_tag(body, "Message");
    match (code, message) {
        (Some(c), Some(m)) => format!("{c}: {m}"),
        (Some(c), None) => c.to_string(),
        _ => body.chars().take(200).collect(),
    }
}

fn extract_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(&xml[start..end])
}
