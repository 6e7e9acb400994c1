use super::client::ApiError;
use crate::types::UploadResponse;
use futures::channel::mpsc;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Bytes handed to the HTTP body per progress step.
pub const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl UploadProgress {
    /// Rounded percentage, or `None` while the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|total| *total > 0)?;
        let ratio = self.loaded.min(total) as f64 / total as f64;
        Some((ratio * 100.0).round() as u8)
    }
}

#[derive(Debug)]
pub enum UploadEvent {
    Progress(UploadProgress),
    Finished(UploadResponse),
    Failed(ApiError),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

pub type UploadEventSender = mpsc::UnboundedSender<UploadEvent>;

/// Events of one upload: progress first, then one terminal event, then the
/// stream ends.
pub struct UploadEvents {
    receiver: mpsc::UnboundedReceiver<UploadEvent>,
    finished: bool,
}

impl UploadEvents {
    pub fn channel() -> (UploadEventSender, UploadEvents) {
        let (sender, receiver) = mpsc::unbounded();
        (
            sender,
            UploadEvents {
                receiver,
                finished: false,
            },
        )
    }
}

impl Stream for UploadEvents {
    type Item = UploadEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.receiver.poll_next_unpin(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Poll::Ready(Some(event))
            }
            // every sender dropped before a terminal event: the upload task died
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(Some(UploadEvent::Failed(ApiError::Interrupted)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Request body that reports each chunk as it is pulled by the connection.
pub(super) fn progress_body(bytes: Arc<[u8]>, sender: UploadEventSender) -> reqwest::Body {
    let total = bytes.len() as u64;
    let chunks = stream::iter((0..bytes.len()).step_by(UPLOAD_CHUNK_BYTES)).map(move |start| {
        let end = (start + UPLOAD_CHUNK_BYTES).min(bytes.len());
        let progress = UploadProgress {
            loaded: end as u64,
            total: Some(total),
        };
        let _ = sender.unbounded_send(UploadEvent::Progress(progress));
        Ok::<_, std::io::Error>(bytes[start..end].to_vec())
    });
    reqwest::Body::wrap_stream(chunks)
}
