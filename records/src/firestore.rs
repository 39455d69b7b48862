//! Firestore REST record store.

use crate::{RecordDocument, RecordError, RecordResult, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";
const DOCUMENT_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct FirestoreRecords {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    access_token: Option<String>,
}

impl FirestoreRecords {
    pub fn new(project_id: String, collection: String) -> Self {
        Self::with_base_url(project_id, collection, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom API base URL. Mainly used for testing.
    pub fn with_base_url(project_id: String, collection: String, base_url: String) -> Self {
        FirestoreRecords {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            collection,
            access_token: None,
        }
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.database_path(), self.collection)
    }

    fn document_url(&self, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(),
            utf8_percent_encode(id, DOCUMENT_ID)
        )
    }

    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.database_path(), self.collection, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> RecordResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecordError::BackendError(format!("{}: {}", status, error_text)));
        }
        Ok(response)
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn encode_fields(doc: &RecordDocument) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(url) = &doc.media_url {
        fields.insert("imageUrl".into(), string_value(url));
    }
    if let Some(url) = &doc.thumbnail_url {
        fields.insert("thumbnailUrl".into(), string_value(url));
    }
    if let Some(name) = &doc.file_name {
        fields.insert("fileName".into(), string_value(name));
    }
    if let Some(kind) = &doc.media_type {
        fields.insert("fileType".into(), string_value(kind));
    }
    if let Some(ts) = doc.uploaded_at {
        fields.insert(
            "uploadedAt".into(),
            json!({ "timestampValue": ts.to_rfc3339() }),
        );
    }
    fields
}

fn field_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(|s| s.to_string())
}

fn field_timestamp(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let value = fields.get(key)?;
    let raw = value
        .get("timestampValue")
        .or_else(|| value.get("stringValue"))?
        .as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}

fn decode_document(doc: FirestoreDocument) -> RecordDocument {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or(&doc.name)
        .to_string();
    RecordDocument {
        id,
        media_url: field_string(&doc.fields, "imageUrl"),
        thumbnail_url: field_string(&doc.fields, "thumbnailUrl"),
        file_name: field_string(&doc.fields, "fileName"),
        media_type: field_string(&doc.fields, "fileType"),
        uploaded_at: field_timestamp(&doc.fields, "uploadedAt"),
    }
}

#[async_trait]
impl RecordStore for FirestoreRecords {
    async fn read_all(&self) -> RecordResult<Vec<RecordDocument>> {
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self
                .authorize(self.client.get(self.collection_url()))
                .query(&query)
                .send()
                .await
                .map_err(|e| RecordError::BackendError(e.to_string()))?;
            let page = Self::check(response)
                .await?
                .json::<ListDocumentsResponse>()
                .await
                .map_err(|e| RecordError::DeserializationError(e.to_string()))?;

            docs.extend(page.documents.into_iter().map(decode_document));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(collection = %self.collection, count = docs.len(), "Read Firestore documents");
        Ok(docs)
    }

    async fn put(&self, doc: RecordDocument) -> RecordResult<()> {
        let response = self
            .authorize(self.client.patch(self.document_url(&doc.id)))
            .json(&json!({ "fields": encode_fields(&doc) }))
            .send()
            .await
            .map_err(|e| RecordError::BackendError(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> RecordResult<()> {
        let response = self
            .authorize(self.client.delete(self.document_url(id)))
            .send()
            .await
            .map_err(|e| RecordError::BackendError(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, docs)))]
    async fn commit_batch(&self, docs: Vec<RecordDocument>) -> RecordResult<()> {
        if docs.is_empty() {
            return Ok(());
        }
        let writes: Vec<Value> = docs
            .iter()
            .map(|doc| {
                json!({
                    "update": {
                        "name": self.document_name(&doc.id),
                        "fields": encode_fields(doc),
                    }
                })
            })
            .collect();
        let url = format!("{}/{}:commit", self.base_url, self.database_path());
        let response = self
            .authorize(self.client.post(url))
            .json(&json!({ "writes": writes }))
            .send()
            .await
            .map_err(|e| RecordError::BackendError(e.to_string()))?;
        Self::check(response).await?;
        tracing::info!(count = docs.len(), "Committed Firestore batch");
        Ok(())
    }
}
