use crate::api::ApiResult;
use crate::types::{ChatMessage, QueryResponse};
use tracing::warn;

pub const FALLBACK_REPLY: &str = "Sorry—something went wrong. Please try again.";

const HTML_FENCE_OPEN: &str = "```html";
const FENCE_CLOSE: &str = "```";

/// Unwraps a reply of the form ```` ```html ... ``` ````. The tag is matched
/// case-insensitively and the inner text is trimmed. Anything else comes back
/// unchanged.
pub fn extract_html(payload: &str) -> &str {
    let Some(tag) = payload.get(..HTML_FENCE_OPEN.len()) else {
        return payload;
    };
    if !tag.eq_ignore_ascii_case(HTML_FENCE_OPEN) {
        return payload;
    }
    match payload[HTML_FENCE_OPEN.len()..].strip_suffix(FENCE_CLOSE) {
        Some(inner) => inner.trim(),
        None => payload,
    }
}

/// Enter sends; shift+Enter is left alone so it inserts a line break.
pub fn is_submit_chord(is_enter: bool, shift_held: bool) -> bool {
    is_enter && !shift_held
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// Transcript plus composer draft. At most one query is in flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    draft: String,
    loading: bool,
}

impl ChatSession {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> ChatState {
        if self.loading {
            ChatState::AwaitingResponse
        } else {
            ChatState::Idle
        }
    }

    pub fn can_send(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    /// Appends the user turn and returns the query to send, or `None` when the
    /// draft is blank or a reply is still pending.
    pub fn begin_send(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let query = self.draft.trim().to_string();
        self.messages.push(ChatMessage::user(query.clone()));
        self.loading = true;
        Some(query)
    }

    pub fn finish(&mut self, outcome: ApiResult<QueryResponse>) {
        if !self.loading {
            return;
        }
        self.loading = false;
        match outcome {
            Ok(reply) => {
                let raw = reply.response.unwrap_or_default();
                self.messages
                    .push(ChatMessage::assistant_html(extract_html(&raw)));
                self.draft.clear();
            }
            Err(err) => {
                warn!(error = %err, "query failed");
                self.messages.push(ChatMessage::assistant_text(FALLBACK_REPLY));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::types::Role;
    use reqwest::StatusCode;

    fn reply(text: &str) -> ApiResult<QueryResponse> {
        Ok(QueryResponse {
            response: Some(text.to_string()),
        })
    }

    fn server_error() -> ApiResult<QueryResponse> {
        Err(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "boom".to_string(),
        })
    }

    #[test]
    fn extracts_fenced_html() {
        assert_eq!(extract_html("```html\n<b>x</b>\n```"), "<b>x</b>");
        assert_eq!(extract_html("```HTML\r\n<i>y</i>\r\n```"), "<i>y</i>");
        assert_eq!(extract_html("plain text"), "plain text");
    }

    #[test]
    fn leaves_partial_fences_alone() {
        assert_eq!(extract_html("```html\n<b>x</b>"), "```html\n<b>x</b>");
        assert_eq!(extract_html("intro ```html<p/>```"), "intro ```html<p/>```");
        assert_eq!(extract_html("```"), "```");
        assert_eq!(extract_html("```html```"), "");
        assert_eq!(extract_html(""), "");
    }

    #[test]
    fn send_appends_user_then_assistant() {
        let mut chat = ChatSession::default();
        chat.set_draft("  hello  ");

        assert_eq!(chat.begin_send().as_deref(), Some("hello"));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0], ChatMessage::user("hello"));
        assert_eq!(chat.state(), ChatState::AwaitingResponse);

        chat.finish(reply("```html\n<p>hi</p>\n```"));
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1], ChatMessage::assistant_html("<p>hi</p>"));
        assert_eq!(chat.draft(), "");
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[test]
    fn blank_drafts_are_dropped() {
        let mut chat = ChatSession::default();
        assert_eq!(chat.begin_send(), None);
        chat.set_draft(" \n\t ");
        assert_eq!(chat.begin_send(), None);
        assert!(chat.messages().is_empty());
        assert!(!chat.is_loading());
    }

    #[test]
    fn second_send_while_awaiting_is_a_no_op() {
        let mut chat = ChatSession::default();
        chat.set_draft("first");
        assert!(chat.begin_send().is_some());

        chat.set_draft("second");
        assert_eq!(chat.begin_send(), None);
        assert_eq!(chat.begin_send(), None);
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn failure_appends_fallback_and_keeps_draft() {
        let mut chat = ChatSession::default();
        chat.set_draft("question");
        chat.begin_send();

        chat.finish(server_error());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].role, Role::Assistant);
        assert_eq!(chat.messages()[1].content, FALLBACK_REPLY);
        assert!(!chat.messages()[1].is_html);
        assert_eq!(chat.draft(), "question");
        assert!(chat.can_send());
    }

    #[test]
    fn missing_response_field_yields_empty_reply() {
        let mut chat = ChatSession::default();
        chat.set_draft("q");
        chat.begin_send();
        chat.finish(Ok(QueryResponse::default()));
        assert_eq!(chat.messages()[1], ChatMessage::assistant_html(""));
    }

    #[test]
    fn completion_without_pending_query_is_ignored() {
        let mut chat = ChatSession::default();
        chat.finish(reply("late"));
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn submit_chord() {
        assert!(is_submit_chord(true, false));
        assert!(!is_submit_chord(true, true));
        assert!(!is_submit_chord(false, false));
    }
}
