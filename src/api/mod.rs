/// HTTP access to the knowledge-base backend.
///
/// # Architecture
///
/// - `client` - `ApiClient`, a reqwest client bound to one base URL
/// - `upload` - progress-reporting upload events
///
/// The views only see the `KnowledgeBackend` trait, so the app can be pointed
/// at anything that speaks the same contract.
///
/// # Usage
///
/// ```rust,no_run
/// use knowledge_desk::api::{ApiClient, DocumentQuery};
///
/// # async fn example() -> knowledge_desk::api::ApiResult<()> {
/// let api = ApiClient::new("http://localhost:8000");
/// let reply = api.send_message("What is in the handbook?").await?;
/// let page = api.get_documents(&DocumentQuery::default()).await?;
/// # Ok(())
/// # }
/// ```
mod client;
mod upload;

use crate::types::{DocumentListResponse, LocalFile, QueryResponse};
use async_trait::async_trait;
use std::sync::Arc;

pub use client::{ApiClient, ApiError, ApiResult, DEFAULT_PAGE_SIZE, DocumentQuery, UPLOAD_FIELD};
pub use upload::{UPLOAD_CHUNK_BYTES, UploadEvent, UploadEventSender, UploadEvents, UploadProgress};

#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    async fn send_message(&self, text: &str) -> ApiResult<QueryResponse>;

    fn upload_document_with_progress(&self, file: LocalFile) -> UploadEvents;

    async fn get_documents(&self, query: &DocumentQuery) -> ApiResult<DocumentListResponse>;

    fn doc_view_url(&self, id: &str) -> String;

    fn doc_download_url(&self, id: &str) -> String;
}

/// Handle the views pull out of the Dioxus context.
pub type SharedBackend = Arc<dyn KnowledgeBackend>;

#[async_trait]
impl KnowledgeBackend for ApiClient {
    async fn send_message(&self, text: &str) -> ApiResult<QueryResponse> {
        ApiClient::send_message(self, text).await
    }

    fn upload_document_with_progress(&self, file: LocalFile) -> UploadEvents {
        ApiClient::upload_document_with_progress(self, file)
    }

    async fn get_documents(&self, query: &DocumentQuery) -> ApiResult<DocumentListResponse> {
        ApiClient::get_documents(self, query).await
    }

    fn doc_view_url(&self, id: &str) -> String {
        ApiClient::doc_view_url(self, id)
    }

    fn doc_download_url(&self, id: &str) -> String {
        ApiClient::doc_download_url(self, id)
    }
}
