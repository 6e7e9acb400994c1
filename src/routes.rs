/// The navigable views of the app.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Chat,
    KnowledgeBase,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Chat, Route::KnowledgeBase];

    pub fn path(self) -> &'static str {
        match self {
            Route::Chat => "/chat",
            Route::KnowledgeBase => "/knowledge-base",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Chat => "Chat",
            Route::KnowledgeBase => "Knowledge Base",
        }
    }

    /// Resolves a path to a view. The empty path and anything unknown land on chat.
    pub fn from_path(path: &str) -> Route {
        let normalized = path.trim().trim_matches('/');
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == normalized)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn resolves_known_paths() {
        assert_eq!(Route::from_path("/chat"), Route::Chat);
        assert_eq!(Route::from_path("/knowledge-base"), Route::KnowledgeBase);
        assert_eq!(Route::from_path("knowledge-base/"), Route::KnowledgeBase);
    }

    #[test]
    fn default_and_unknown_paths_fall_back_to_chat() {
        assert_eq!(Route::from_path(""), Route::Chat);
        assert_eq!(Route::from_path("/"), Route::Chat);
        assert_eq!(Route::from_path("/settings"), Route::Chat);
        assert_eq!(Route::from_path("/knowledge-base/extra"), Route::Chat);
    }

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }
}
