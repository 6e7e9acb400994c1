use crate::api::{ApiClient, SharedBackend};
use crate::config::AppConfig;
use crate::routes::Route;
use crate::views::{ChatView, KnowledgeBaseView};
use dioxus::prelude::*;
use std::sync::Arc;

const MAIN_CSS: Asset = asset!("/assets/main.css");

/// Root component. Expects an `AppConfig` in the launch context.
#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let backend_url = config.api_url.clone();
    use_context_provider(move || -> SharedBackend { Arc::new(ApiClient::new(backend_url)) });
    let active_route = use_signal(move || config.start_route);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        AppHeader { active_route }
        div { class: "tab-panels",
            RoutePanel {
                active_route,
                route: Route::Chat,
                children: rsx!( ChatView {} ),
            }
            RoutePanel {
                active_route,
                route: Route::KnowledgeBase,
                children: rsx!( KnowledgeBaseView {} ),
            }
        }
    }
}

#[component]
fn AppHeader(active_route: Signal<Route>) -> Element {
    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                span { class: "header-wordmark", "Knowledge Desk" }
                div { class: "tabs",
                    for route in Route::ALL {
                        RouteTab { key: "{route.path()}", active_route, route }
                    }
                }
            }
        }
    }
}

// Both panels stay mounted so the transcript survives switching views.
#[component]
fn RoutePanel(active_route: Signal<Route>, route: Route, children: Element) -> Element {
    let is_active = active_route() == route;
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            class: format_args!("tab-panel {}", class_suffix),
            "data-path": route.path(),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}

#[component]
fn RouteTab(active_route: Signal<Route>, route: Route) -> Element {
    let mut active_route = active_route;
    let class = if active_route() == route {
        "tab active"
    } else {
        "tab"
    };
    rsx! {
        h1 {
            class: class,
            onclick: move |_| {
                tracing::debug!(path = route.path(), "switching view");
                active_route.set(route);
            },
            "{route.label()}"
        }
    }
}
