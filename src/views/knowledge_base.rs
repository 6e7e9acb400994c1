use crate::api::SharedBackend;
use crate::session::library::LoadRequest;
use crate::session::upload::content_type_for;
use crate::session::{
    DocumentLibrary, FileRejection, UploadEffect, UploadSession, format_size, format_uploaded_at,
    validate_file,
};
use crate::types::LocalFile;
use crate::views::shared::{display_file_name, open_in_new_context};
use dioxus::events::Key;
use dioxus::html::{FileEngine, HasFileData};
use dioxus::prelude::*;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the first picked file. Type and size are checked from metadata
/// before the contents are loaded.
async fn read_picked_file(files: Arc<dyn FileEngine>) -> Option<Result<LocalFile, FileRejection>> {
    let path = files.files().into_iter().next()?;
    let content_type = content_type_for(&path);
    if let Some(size) = files.file_size(&path).await
        && let Err(rejection) = validate_file(content_type, size)
    {
        return Some(Err(rejection));
    }
    let Some(bytes) = files.read_file(&path).await else {
        warn!(file = %path, "could not read picked file");
        return Some(Err(FileRejection::Unreadable));
    };
    Some(Ok(LocalFile::new(display_file_name(&path), content_type, bytes)))
}

#[component]
pub fn KnowledgeBaseView() -> Element {
    let backend = use_context::<SharedBackend>();
    let mut upload = use_signal(UploadSession::default);
    let mut library = use_signal(DocumentLibrary::default);

    let list_backend = backend.clone();
    let load_documents = use_callback(move |request: LoadRequest| {
        let backend = list_backend.clone();
        spawn(async move {
            let result = backend.get_documents(&request.query).await;
            library.with_mut(|lib| lib.finish_load(request, result));
        });
    });

    use_effect(move || {
        let request = library.with_mut(|lib| lib.begin_load(1));
        load_documents.call(request);
    });

    let accept_files = use_callback(move |files: Arc<dyn FileEngine>| {
        spawn(async move {
            match read_picked_file(files).await {
                Some(Ok(file)) => {
                    if let Err(rejection) = upload.with_mut(|session| session.select_file(file)) {
                        debug!(%rejection, "file not selected");
                    }
                }
                Some(Err(rejection)) => upload.with_mut(|session| session.reject(rejection)),
                None => {}
            }
        });
    });

    let start_upload = use_callback(move |_: ()| {
        let Some(file) = upload.with_mut(UploadSession::begin_upload) else {
            return;
        };
        let backend = backend.clone();
        spawn(async move {
            let mut events = backend.upload_document_with_progress(file);
            while let Some(event) = events.next().await {
                if upload.with_mut(|session| session.apply(event)) == UploadEffect::RefreshListing {
                    let request = library.with_mut(|lib| lib.begin_load(1));
                    load_documents.call(request);
                }
            }
        });
    });

    let session = upload();
    let uploading = session.is_uploading();

    rsx! {
        div { class: "main-container kb-container",
            section { class: "upload-card",
                h3 { class: "section-title", "Upload a document" }
                div {
                    class: format_args!("drop-zone {}", if session.is_drag_over() { "drag-over" } else { "" }),
                    ondragover: move |evt: DragEvent| {
                        evt.prevent_default();
                        if !upload.read().is_drag_over() {
                            upload.with_mut(|session| session.set_drag_over(true));
                        }
                    },
                    ondragleave: move |_| upload.with_mut(|session| session.set_drag_over(false)),
                    ondrop: move |evt: DragEvent| {
                        evt.prevent_default();
                        upload.with_mut(|session| session.set_drag_over(false));
                        if upload.read().is_uploading() {
                            return;
                        }
                        if let Some(files) = evt.files() {
                            accept_files.call(files);
                        }
                    },
                    p { class: "text-muted", "Drag a PDF here, or" }
                    label { class: "btn btn-ghost file-picker",
                        "Choose file"
                        input {
                            r#type: "file",
                            accept: ".pdf,application/pdf",
                            disabled: uploading,
                            onchange: move |evt: FormEvent| {
                                if let Some(files) = evt.files() {
                                    accept_files.call(files);
                                }
                            },
                        }
                    }
                    p { class: "text-muted hint", "PDF only, up to 50 MB." }
                }

                if let Some(file) = session.file() {
                    div { class: "selected-file",
                        span { class: "file-name", "{file.name}" }
                        span { class: "file-size", "{format_size(file.size())}" }
                        button {
                            class: "btn btn-ghost", r#type: "button",
                            disabled: uploading,
                            onclick: move |_| upload.with_mut(UploadSession::clear_file),
                            "Remove"
                        }
                    }
                }

                if uploading {
                    div { class: "progress",
                        div { class: "progress-bar", style: "width: {session.progress()}%;" }
                    }
                    p { class: "text-muted", "Uploading… {session.progress()}%" }
                }

                if !session.message().is_empty() {
                    p { class: "upload-message", "{session.message()}" }
                }
                if !session.error().is_empty() {
                    p { class: "upload-error", "{session.error()}" }
                }

                button {
                    class: "btn btn-primary", r#type: "button",
                    disabled: !session.can_upload(),
                    onclick: move |_| start_upload.call(()),
                    if uploading { "Uploading…" } else { "Upload" }
                }
            }

            DocumentTable { library, load_documents }
        }
    }
}

#[component]
fn DocumentTable(
    library: Signal<DocumentLibrary>,
    load_documents: Callback<LoadRequest>,
) -> Element {
    let mut library = library;
    let backend = use_context::<SharedBackend>();
    let snapshot = library();
    let total_pages = snapshot.total_pages();

    rsx! {
        section { class: "doc-library",
            div { class: "doc-controls",
                h3 { class: "section-title", "Documents" }
                input {
                    class: "doc-search",
                    r#type: "search",
                    placeholder: "Search by file name and press Enter",
                    value: "{snapshot.search_text()}",
                    oninput: move |evt: FormEvent| library.with_mut(|lib| lib.set_search(evt.value())),
                    onkeydown: move |evt: KeyboardEvent| {
                        if evt.key() == Key::Enter {
                            evt.prevent_default();
                            let request = library.with_mut(DocumentLibrary::search);
                            load_documents.call(request);
                        }
                    },
                }
            }

            if let Some(error) = snapshot.error() {
                p { class: "upload-error", "{error}" }
            }

            if snapshot.is_loading() {
                p { class: "text-muted", "Loading documents…" }
            } else if snapshot.docs().is_empty() {
                div { class: "doc-empty",
                    p { class: "text-muted", "No documents found." }
                }
            } else {
                div { class: "doc-table",
                    div { class: "doc-table-header",
                        span { class: "doc-col-title", "File" }
                        span { class: "doc-col-size", "Size" }
                        span { class: "doc-col-date", "Uploaded" }
                        span { class: "doc-col-index", "Indexed" }
                        span { class: "doc-col-actions", "" }
                    }
                    div { class: "doc-table-body",
                        for doc in snapshot.docs().iter().cloned() {
                            DocumentRow {
                                key: "{doc.id}",
                                file_name: doc.file_name.clone(),
                                size: format_size(doc.file_size_bytes),
                                uploaded: format_uploaded_at(&doc.uploaded_at),
                                indexed: doc.is_in_vector_store(),
                                view_url: backend.doc_view_url(&doc.id),
                                download_url: backend.doc_download_url(&doc.id),
                            }
                        }
                    }
                }
            }

            div { class: "pager",
                button {
                    class: "btn btn-ghost", r#type: "button",
                    disabled: !snapshot.has_prev(),
                    onclick: move |_| {
                        if let Some(request) = library.with_mut(DocumentLibrary::prev_page) {
                            load_documents.call(request);
                        }
                    },
                    "Previous"
                }
                span { class: "pager-status",
                    "Page {snapshot.page()} of {total_pages} · {snapshot.total()} documents"
                }
                button {
                    class: "btn btn-ghost", r#type: "button",
                    disabled: !snapshot.has_next(),
                    onclick: move |_| {
                        if let Some(request) = library.with_mut(DocumentLibrary::next_page) {
                            load_documents.call(request);
                        }
                    },
                    "Next"
                }
            }
        }
    }
}

#[component]
fn DocumentRow(
    file_name: String,
    size: String,
    uploaded: String,
    indexed: bool,
    view_url: String,
    download_url: String,
) -> Element {
    rsx! {
        div { class: "doc-row",
            span { class: "doc-row-title", "{file_name}" }
            span { class: "doc-row-size", "{size}" }
            span { class: "doc-row-date", "{uploaded}" }
            span { class: "doc-row-index",
                if indexed {
                    span { class: "tag-pill tag-pill-compact", "Indexed" }
                } else {
                    span { class: "tag-pill tag-pill-muted", "Pending" }
                }
            }
            div { class: "doc-row-actions",
                button {
                    class: "action-btn", r#type: "button",
                    onclick: move |_| open_in_new_context(&view_url),
                    "View"
                }
                button {
                    class: "action-btn", r#type: "button",
                    onclick: move |_| open_in_new_context(&download_url),
                    "Download"
                }
            }
        }
    }
}
