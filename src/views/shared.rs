use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use std::path::Path;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    // replies are usually HTML already; let it through untouched
    options.render.unsafe_ = true;
    options
});

/// Renders an assistant reply. HTML blocks pass through as-is; plain text and
/// markdown get paragraphs and highlighted code fences.
pub fn render_reply_html(content: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(content, &MARKDOWN_OPTIONS, &plugins)
}

/// Desktop pickers hand over full paths; keep only the file name.
pub fn display_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Scrolls an element to its end once the pending DOM update has landed.
pub fn scroll_to_bottom(element_id: &str) {
    let script = format!(
        "requestAnimationFrame(() => {{ const el = document.getElementById({}); if (el) el.scrollTop = el.scrollHeight; }});",
        js_string(element_id)
    );
    let _ = document::eval(&script);
}

/// Opens a URL in a new browsing context (tab or system browser).
pub fn open_in_new_context(url: &str) {
    tracing::debug!(%url, "opening in new context");
    let script = format!("window.open({}, '_blank', 'noopener');", js_string(url));
    let _ = document::eval(&script);
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_replies_pass_through() {
        let html = render_reply_html("<h2>Answer</h2>\n<p>Body</p>");
        assert!(html.contains("<h2>Answer</h2>"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn plain_replies_get_paragraphs() {
        assert_eq!(render_reply_html("plain text"), "<p>plain text</p>\n");
    }

    #[test]
    fn strips_directories_from_picked_paths() {
        assert_eq!(display_file_name("/home/me/docs/report.pdf"), "report.pdf");
        assert_eq!(display_file_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn js_strings_are_escaped() {
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
        assert_eq!(js_string("chat-list"), r#""chat-list""#);
    }
}
