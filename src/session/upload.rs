use crate::api::UploadEvent;
use crate::types::LocalFile;
use std::path::Path;
use tracing::warn;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const MAX_UPLOAD_MB: u64 = 50;
pub const MAX_UPLOAD_BYTES: u64 = MAX_UPLOAD_MB * 1024 * 1024;

pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";
pub const DEFAULT_UPLOADED_MESSAGE: &str = "Uploaded.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("Only PDF files are allowed.")]
    NotPdf,

    #[error("File is too large. Max {} MB.", MAX_UPLOAD_MB)]
    TooLarge,

    #[error("Could not read the selected file.")]
    Unreadable,

    #[error("An upload is already in progress.")]
    UploadInProgress,
}

/// Type is checked before size, so a wrong type is reported whatever the size.
pub fn validate_file(content_type: &str, size: u64) -> Result<(), FileRejection> {
    if content_type != PDF_CONTENT_TYPE {
        return Err(FileRejection::NotPdf);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(FileRejection::TooLarge);
    }
    Ok(())
}

/// The file pickers only hand over names, so the content type comes from the
/// extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => PDF_CONTENT_TYPE,
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadPhase {
    Empty,
    FileSelected,
    Uploading,
    Done,
    Failed,
}

/// What the panel has to do after an upload event was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadEffect {
    None,
    RefreshListing,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadSession {
    file: Option<LocalFile>,
    uploading: bool,
    progress: u8,
    message: String,
    error: String,
    drag_over: bool,
}

impl UploadSession {
    pub fn file(&self) -> Option<&LocalFile> {
        self.file.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn phase(&self) -> UploadPhase {
        if self.uploading {
            UploadPhase::Uploading
        } else if !self.error.is_empty() {
            UploadPhase::Failed
        } else if self.file.is_some() {
            UploadPhase::FileSelected
        } else if !self.message.is_empty() {
            UploadPhase::Done
        } else {
            UploadPhase::Empty
        }
    }

    pub fn can_upload(&self) -> bool {
        self.file.is_some() && !self.uploading
    }

    pub fn set_drag_over(&mut self, drag_over: bool) {
        self.drag_over = drag_over;
    }

    /// Takes a picked or dropped file, replacing any earlier selection. The
    /// selection is frozen while an upload runs.
    pub fn select_file(&mut self, file: LocalFile) -> Result<(), FileRejection> {
        if self.uploading {
            return Err(FileRejection::UploadInProgress);
        }
        self.message.clear();
        self.error.clear();
        if let Err(rejection) = validate_file(&file.content_type, file.size()) {
            self.reject(rejection);
            return Err(rejection);
        }
        self.file = Some(file);
        Ok(())
    }

    /// Records a rejection found before the file contents were read.
    pub fn reject(&mut self, rejection: FileRejection) {
        if self.uploading {
            return;
        }
        self.message.clear();
        self.error = rejection.to_string();
        self.file = None;
    }

    pub fn clear_file(&mut self) {
        if self.uploading {
            return;
        }
        self.file = None;
        self.message.clear();
        self.error.clear();
        self.progress = 0;
    }

    /// Starts an upload of the selected file. The selection stays in place
    /// until the upload succeeds.
    pub fn begin_upload(&mut self) -> Option<LocalFile> {
        if !self.can_upload() {
            return None;
        }
        self.uploading = true;
        self.progress = 0;
        self.message.clear();
        self.error.clear();
        self.file.clone()
    }

    pub fn apply(&mut self, event: UploadEvent) -> UploadEffect {
        if !self.uploading {
            return UploadEffect::None;
        }
        match event {
            UploadEvent::Progress(progress) => {
                if let Some(percent) = progress.percent() {
                    self.progress = percent;
                }
                UploadEffect::None
            }
            UploadEvent::Finished(response) => {
                self.uploading = false;
                self.message = response
                    .message
                    .unwrap_or_else(|| DEFAULT_UPLOADED_MESSAGE.to_string());
                self.file = None;
                UploadEffect::RefreshListing
            }
            UploadEvent::Failed(err) => {
                warn!(error = %err, "upload failed");
                self.uploading = false;
                self.error = UPLOAD_FAILED_MESSAGE.to_string();
                UploadEffect::None
            }
        }
    }
}
