//! UI-independent state machines behind the two panels.
//!
//! Views own one of these inside a signal, call the `begin_*` method on a
//! user event, run the returned request, and feed the completion back in.
pub mod chat;
pub mod library;
pub mod upload;

pub use chat::{ChatSession, ChatState, FALLBACK_REPLY, extract_html};
pub use library::{DocumentLibrary, LoadRequest, format_size, format_uploaded_at};
pub use upload::{FileRejection, UploadEffect, UploadPhase, UploadSession, validate_file};
