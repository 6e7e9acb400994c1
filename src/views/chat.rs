use crate::api::SharedBackend;
use crate::session::ChatSession;
use crate::session::chat::is_submit_chord;
use crate::types::{ChatMessage, Role};
use crate::views::shared::{render_reply_html, scroll_to_bottom};
use dioxus::events::Key;
use dioxus::prelude::*;

const MESSAGE_PANE_ID: &str = "chat-list";

fn role_class(role: &Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[component]
pub fn ChatView() -> Element {
    let backend = use_context::<SharedBackend>();
    let mut session = use_signal(ChatSession::default);

    let send_message = use_callback(move |_: ()| {
        let Some(query) = session.with_mut(ChatSession::begin_send) else {
            return;
        };
        scroll_to_bottom(MESSAGE_PANE_ID);

        let backend = backend.clone();
        spawn(async move {
            let outcome = backend.send_message(&query).await;
            session.with_mut(|chat| chat.finish(outcome));
            scroll_to_bottom(MESSAGE_PANE_ID);
        });
    });

    let snapshot = session();

    rsx! {
        div { class: "main-container",
            div { class: "chat-wrap",
                div { id: MESSAGE_PANE_ID, class: "chat-list",
                    if snapshot.messages().is_empty() {
                        p { class: "text-muted chat-empty", "Ask anything about your uploaded documents." }
                    }
                    for (i, msg) in snapshot.messages().iter().enumerate() {
                        div { key: "{i}", class: format_args!("message-row {}", role_class(&msg.role)),
                            if matches!(msg.role, Role::Assistant) { div { class: "avatar assistant", "KB" } }
                            div { class: format_args!("bubble {}", role_class(&msg.role)),
                                MessageBody { message: msg.clone() }
                            }
                        }
                    }
                    if snapshot.is_loading() {
                        div { class: "message-row assistant",
                            div { class: "avatar assistant", "KB" }
                            div { class: "shimmer-line",
                                span { class: "shimmer-text", "Thinking…" }
                            }
                        }
                    }
                }
            }

            form { class: "composer no-divider",
                onsubmit: move |ev| ev.prevent_default(),
                div { class: "composer-inner",
                    div { class: "hstack",
                        textarea {
                            rows: "1",
                            placeholder: "Ask a question…",
                            value: "{snapshot.draft()}",
                            oninput: move |ev| session.with_mut(|chat| chat.set_draft(ev.value())),
                            onkeydown: move |ev: KeyboardEvent| {
                                if is_submit_chord(ev.key() == Key::Enter, ev.modifiers().shift()) {
                                    ev.prevent_default();
                                    send_message.call(());
                                }
                            },
                            autofocus: true,
                        }
                        button {
                            class: "btn btn-primary", r#type: "button",
                            disabled: !snapshot.can_send(),
                            onclick: move |_| send_message.call(()),
                            "Send"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn MessageBody(message: ChatMessage) -> Element {
    if message.is_html {
        let html = render_reply_html(&message.content);
        rsx! { div { class: "md", dangerous_inner_html: "{html}" } }
    } else {
        rsx! { div { class: "plain", "{message.content}" } }
    }
}
