//! Firebase Storage REST backend.

use crate::{directory_prefix, keys, report_progress, ObjectStore, ProgressCallback, StorageError, StorageResult};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com";
/// Resumable chunks must be a multiple of 256 KiB.
const CHUNK_SIZE: usize = 4 * 256 * 1024;
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    download_tokens: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsResponse {
    #[serde(default)]
    items: Vec<ListedObject>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    bucket: String,
    base_url: String,
    access_token: Option<String>,
}

impl FirebaseStorage {
    pub fn new(bucket: String) -> Self {
        Self::with_base_url(bucket, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom API base URL. Mainly used for testing.
    pub fn with_base_url(bucket: String, base_url: String) -> Self {
        FirebaseStorage {
            client: reqwest::Client::new(),
            bucket,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.base_url, self.bucket)
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.objects_url(),
            utf8_percent_encode(key, OBJECT_NAME)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.header(AUTHORIZATION, format!("Firebase {}", token)),
            None => request,
        }
    }

    async fn check(response: Response, key: &str) -> StorageResult<Response> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StorageError::BackendError(error_text));
        }
        Ok(response)
    }

    /// Open a resumable upload session and return its session URL.
    async fn start_session(&self, key: &str, total: u64, content_type: &str) -> StorageResult<String> {
        let response = self
            .authorize(self.client.post(self.objects_url()))
            .query(&[("name", key)])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", total.to_string())
            .header("X-Goog-Upload-Header-Content-Type", content_type)
            .json(&json!({ "name": key, "contentType": content_type }))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let response = Self::check(response, key).await?;

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| StorageError::UploadFailed(format!("No upload session returned for {}", key)))
    }

    async fn metadata(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let response = self
            .authorize(self.client.get(self.object_url(key)))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        let response = Self::check(response, key).await?;
        response
            .json::<ObjectMetadata>()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, data, progress)))]
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> StorageResult<()> {
        keys::validate_key(key)?;
        let total = data.len() as u64;
        let session = self.start_session(key, total, content_type).await?;
        report_progress(&progress, 0, total);

        let mut offset = 0usize;
        loop {
            let end = (offset + CHUNK_SIZE).min(data.len());
            let last = end == data.len();
            let command = if last { "upload, finalize" } else { "upload" };

            let response = self
                .client
                .post(&session)
                .header("X-Goog-Upload-Command", command)
                .header("X-Goog-Upload-Offset", offset.to_string())
                .body(data[offset..end].to_vec())
                .send()
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

            if !response.status().is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(StorageError::UploadFailed(format!(
                    "{} at offset {}: {}",
                    key, offset, error_text
                )));
            }

            offset = end;
            report_progress(&progress, offset as u64, total);
            if last {
                break;
            }
        }

        tracing::info!(key = %key, size_bytes = total, "Firebase upload finalized");
        Ok(())
    }

    async fn download_url(&self, key: &str) -> StorageResult<String> {
        let meta = self.metadata(key).await?;
        let token = meta
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StorageError::BackendError(format!("No download token for {}", meta.name)))?;
        Ok(format!("{}?alt=media&token={}", self.object_url(key), token))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let response = self
            .authorize(self.client.delete(self.object_url(key)))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
        Self::check(response, key).await?;
        tracing::debug!(key = %key, "Firebase object deleted");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = directory_prefix(prefix);
        let mut keys = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("prefix", prefix.clone()), ("delimiter", "/".to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self
                .authorize(self.client.get(self.objects_url()))
                .query(&query)
                .send()
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
            let response = Self::check(response, &prefix).await?;
            let page = response
                .json::<ListObjectsResponse>()
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;

            keys.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(prefix = %prefix, count = keys.len(), "Listed Firebase objects");
        Ok(keys)
    }
}
