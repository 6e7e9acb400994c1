use crate::api::{ApiResult, DEFAULT_PAGE_SIZE, DocumentQuery};
use crate::types::{DocumentListResponse, DocumentMeta};
use time::format_description::well_known::Rfc3339;
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::FormatItem,
    macros::format_description,
};
use tracing::{info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Could not load documents.";

const UPLOADED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:zero], [year]");
const NAIVE_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_TIMESTAMP_FRACTIONAL: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// `"N B"`, `"N.N KB"` or `"N.N MB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1} KB");
    }
    format!("{:.1} MB", kb / 1024.0)
}

/// Backend timestamps come either with an offset or naive (UTC). Anything
/// unparseable is shown as sent.
pub fn format_uploaded_at(raw: &str) -> String {
    parse_timestamp(raw.trim())
        .and_then(|datetime| datetime.format(UPLOADED_AT_FORMAT).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let datetime = OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        PrimitiveDateTime::parse(raw, NAIVE_TIMESTAMP_FRACTIONAL)
            .or_else(|_| PrimitiveDateTime::parse(raw, NAIVE_TIMESTAMP))
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    })?;
    Some(match UtcOffset::current_local_offset() {
        Ok(offset) => datetime.to_offset(offset),
        Err(_) => datetime,
    })
}

/// One listing fetch. `generation` orders requests so a slow response cannot
/// overwrite a newer page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub query: DocumentQuery,
}

/// The currently shown page of the document listing plus its search box.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentLibrary {
    docs: Vec<DocumentMeta>,
    total: u64,
    page: u32,
    page_size: u32,
    search: String,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl Default for DocumentLibrary {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            total: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl DocumentLibrary {
    pub fn docs(&self) -> &[DocumentMeta] {
        &self.docs
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total_pages(&self) -> u32 {
        let page_size = u64::from(self.page_size.max(1));
        let pages = self.total.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn begin_load(&mut self, page: u32) -> LoadRequest {
        self.loading = true;
        self.generation += 1;
        let mut query = DocumentQuery::new(page.max(1), self.page_size);
        if !self.search.trim().is_empty() {
            query = query.with_search(self.search.trim());
        }
        LoadRequest {
            generation: self.generation,
            query,
        }
    }

    /// Enter in the search box: back to the first page with the current text.
    pub fn search(&mut self) -> LoadRequest {
        self.begin_load(1)
    }

    pub fn next_page(&mut self) -> Option<LoadRequest> {
        if !self.has_next() {
            return None;
        }
        Some(self.begin_load(self.page + 1))
    }

    pub fn prev_page(&mut self) -> Option<LoadRequest> {
        if !self.has_prev() {
            return None;
        }
        Some(self.begin_load(self.page - 1))
    }

    /// Applies a listing response. Returns `false` when a newer request has
    /// been issued since, in which case nothing changes.
    pub fn finish_load(
        &mut self,
        request: LoadRequest,
        result: ApiResult<DocumentListResponse>,
    ) -> bool {
        if request.generation != self.generation {
            return false;
        }
        self.loading = false;
        match result {
            Ok(response) => {
                info!(
                    page = request.query.page,
                    items = response.items.len(),
                    total = response.total,
                    "documents loaded"
                );
                self.docs = response.items;
                self.total = response.total;
                self.page = response.page.unwrap_or(request.query.page).max(1);
                self.page_size = response
                    .page_size
                    .unwrap_or(request.query.page_size)
                    .max(1);
                self.error = None;
            }
            Err(err) => {
                warn!(page = request.query.page, error = %err, "document listing failed");
                self.docs.clear();
                self.total = 0;
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn doc(id: &str) -> DocumentMeta {
        DocumentMeta {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            content_type: "application/pdf".to_string(),
            file_size_bytes: 1024,
            uploaded_at: "2024-03-05T12:00:00".to_string(),
            has_md_text: None,
            in_vector_store: None,
        }
    }

    fn page_of(total: u64, page: u32) -> DocumentListResponse {
        DocumentListResponse {
            items: vec![doc("a"), doc("b")],
            total,
            page: Some(page),
            page_size: Some(10),
        }
    }

    fn loaded(total: u64, page: u32) -> DocumentLibrary {
        let mut library = DocumentLibrary::default();
        let request = library.begin_load(page);
        assert!(library.finish_load(request, Ok(page_of(total, page))));
        library
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn formats_upload_timestamps() {
        assert_eq!(format_uploaded_at("2024-03-05T12:00:00Z"), "Mar 05, 2024");
        assert_eq!(format_uploaded_at("2024-03-05T12:00:00.123456"), "Mar 05, 2024");
        assert_eq!(format_uploaded_at("2024-03-05T12:00:00"), "Mar 05, 2024");
        assert_eq!(format_uploaded_at("yesterday"), "yesterday");
    }

    #[test]
    fn counts_pages() {
        assert_eq!(loaded(25, 1).total_pages(), 3);
        assert_eq!(loaded(30, 1).total_pages(), 3);
        assert_eq!(loaded(0, 1).total_pages(), 1);
        assert_eq!(DocumentLibrary::default().total_pages(), 1);
    }

    #[test]
    fn paging_stops_at_the_edges() {
        let mut first = loaded(25, 1);
        assert_eq!(first.prev_page(), None);
        assert!(!first.is_loading());
        assert_eq!(first.next_page().map(|r| r.query.page), Some(2));

        let mut last = loaded(25, 3);
        assert_eq!(last.next_page(), None);
        assert!(!last.is_loading());
        assert_eq!(last.prev_page().map(|r| r.query.page), Some(2));
    }

    #[test]
    fn search_restarts_at_page_one_with_text() {
        let mut library = loaded(25, 3);
        library.set_search("  contract ");
        let request = library.search();
        assert_eq!(request.query.page, 1);
        assert_eq!(request.query.q.as_deref(), Some("contract"));
        assert!(library.is_loading());

        library.set_search("");
        assert_eq!(library.search().query.q, None);
    }

    #[test]
    fn missing_page_fields_fall_back_to_request() {
        let mut library = DocumentLibrary::default();
        let request = library.begin_load(2);
        library.finish_load(
            request,
            Ok(DocumentListResponse {
                items: vec![doc("a")],
                total: 11,
                page: None,
                page_size: None,
            }),
        );
        assert_eq!(library.page(), 2);
        assert_eq!(library.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(library.total_pages(), 2);
    }

    #[test]
    fn failed_listing_clears_the_page() {
        let mut library = loaded(25, 2);
        assert_eq!(library.docs().len(), 2);

        let request = library.begin_load(3);
        library.finish_load(request, Err(ApiError::Interrupted));
        assert!(library.docs().is_empty());
        assert_eq!(library.total(), 0);
        assert_eq!(library.error(), Some(LOAD_FAILED_MESSAGE));
        assert!(!library.is_loading());
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut library = DocumentLibrary::default();
        let stale = library.begin_load(1);
        library.set_search("newer");
        let fresh = library.search();

        assert!(library.finish_load(fresh, Ok(page_of(1, 1))));
        assert!(!library.finish_load(stale, Ok(page_of(99, 1))));
        assert_eq!(library.total(), 1);
    }

    #[test]
    fn begin_load_clamps_page_to_one() {
        let mut library = DocumentLibrary::default();
        assert_eq!(library.begin_load(0).query.page, 1);
    }

    #[test]
    fn vector_store_flag_falls_back_to_md_text() {
        let mut meta = doc("x");
        meta.in_vector_store = Some(true);
        meta.has_md_text = Some(false);
        assert!(meta.is_in_vector_store());

        let mut legacy = doc("y");
        legacy.has_md_text = Some(true);
        assert!(legacy.is_in_vector_store());

        assert!(!doc("z").is_in_vector_store());
    }
}
