//! Search engines and their query templates.

/// Search engines the address bar can fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchEngine {
    #[default]
    Bing,
    Google,
    DuckDuckGo,
}

impl SearchEngine {
    /// Resolve the engine named in settings. Matching is case-insensitive;
    /// unknown names fall back to Bing.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "google" => Self::Google,
            "duckduckgo" | "ddg" => Self::DuckDuckGo,
            "bing" => Self::Bing,
            other => {
                log::debug!("Unknown search engine {other:?}, using Bing");
                Self::Bing
            },
        }
    }

    /// Query template; `%s` is replaced by the percent-encoded term.
    pub fn template(self) -> &'static str {
        match self {
            Self::Bing => "https://www.bing.com/search?q=%s",
            Self::Google => "https://www.google.com/search?q=%s",
            Self::DuckDuckGo => "https://duckduckgo.com/?q=%s",
        }
    }

    /// Build the results URL for `term`. Every byte outside the unreserved
    /// set (`A-Z a-z 0-9 - . _ ~`) is percent-encoded, so spaces become `%20`.
    pub fn search_url(self, term: &str) -> String {
        self.template().replace("%s", &urlencoding::encode(term))
    }
}
