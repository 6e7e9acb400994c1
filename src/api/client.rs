use super::upload::{self, UploadEvent, UploadEvents};
use crate::types::{DocumentListResponse, LocalFile, QueryResponse, UploadResponse};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const QUERY_PATH: &str = "/query";
const UPLOAD_PATH: &str = "/upload-documents";
const DOCUMENTS_PATH: &str = "/documents";

/// Multipart field the backend reads the PDF from.
pub const UPLOAD_FIELD: &str = "file";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend error {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upload ended without a response")]
    Interrupted,
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================
// Request / Response Shapes
// ============================================

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

// FastAPI reports failures as { "detail": "..." } or { "detail": [ ... ] }
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            detail: error_detail(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Page request for `GET /documents`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentQuery {
    pub page: u32,
    pub page_size: u32,
    pub q: Option<String>,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            q: None,
        }
    }
}

impl DocumentQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            q: None,
        }
    }

    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// `q` is left out entirely when there is no search text.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        pairs
    }
}

// ============================================
// Client
// ============================================

/// Client for the knowledge-base backend, bound to one base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the knowledge base a question.
    pub async fn send_message(&self, text: &str) -> ApiResult<QueryResponse> {
        debug!(chars = text.len(), "sending query");
        let response = self
            .client
            .post(self.endpoint(QUERY_PATH))
            .json(&QueryRequest { query: text })
            .send()
            .await?;
        read_json(response).await
    }

    /// Upload a document in one shot, without progress reporting.
    pub async fn upload_document(&self, file: &LocalFile) -> ApiResult<UploadResponse> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .client
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    /// Upload a document, reporting progress as the body is streamed out.
    ///
    /// The request runs on its own task. The returned stream yields
    /// `UploadEvent::Progress` items and then exactly one terminal event.
    pub fn upload_document_with_progress(&self, file: LocalFile) -> UploadEvents {
        let (sender, events) = UploadEvents::channel();
        let client = self.client.clone();
        let url = self.endpoint(UPLOAD_PATH);

        tokio::spawn(async move {
            let name = file.name.clone();
            let terminal = match stream_upload(&client, &url, file, sender.clone()).await {
                Ok(response) => {
                    info!(file = %name, "document uploaded");
                    UploadEvent::Finished(response)
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "document upload failed");
                    UploadEvent::Failed(err)
                }
            };
            let _ = sender.unbounded_send(terminal);
        });

        events
    }

    /// Fetch one page of the document listing.
    pub async fn get_documents(&self, query: &DocumentQuery) -> ApiResult<DocumentListResponse> {
        debug!(page = query.page, page_size = query.page_size, q = ?query.q, "listing documents");
        let response = self
            .client
            .get(self.endpoint(DOCUMENTS_PATH))
            .query(&query.query_pairs())
            .send()
            .await?;
        read_json(response).await
    }

    pub fn doc_view_url(&self, id: &str) -> String {
        format!("{}{}/{}/view", self.base_url, DOCUMENTS_PATH, id)
    }

    pub fn doc_download_url(&self, id: &str) -> String {
        format!("{}{}/{}/download", self.base_url, DOCUMENTS_PATH, id)
    }
}

async fn stream_upload(
    client: &reqwest::Client,
    url: &str,
    file: LocalFile,
    sender: upload::UploadEventSender,
) -> ApiResult<UploadResponse> {
    let total = file.size();
    let body = upload::progress_body(file.bytes.clone(), sender);
    let part = Part::stream_with_length(body, total)
        .file_name(file.name.clone())
        .mime_str(&file.content_type)?;
    let form = Form::new().part(UPLOAD_FIELD, part);
    let response = client.post(url).multipart(form).send().await?;
    read_json(response).await
}
