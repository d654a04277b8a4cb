//! Persisted data model: history entries, bookmarks, settings.
//!
//! Field names on disk are camelCase. Every field is read on its own: a
//! missing field, a `null`, or a value of the wrong type keeps that field's
//! default and the rest of the record still loads. Documents written by
//! older builds (or edited by hand) therefore keep whatever is usable.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// -----------------------------------------------------------------------
// CollectionKind
// -----------------------------------------------------------------------

/// The three collections Lumen persists, one JSON document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Settings,
    Bookmarks,
    History,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [Self::Settings, Self::Bookmarks, Self::History];

    /// File name of the document inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Settings => "settings.json",
            Self::Bookmarks => "bookmarks.json",
            Self::History => "history.json",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Settings => "settings",
            Self::Bookmarks => "bookmarks",
            Self::History => "history",
        })
    }
}

// -----------------------------------------------------------------------
// HistoryEntry
// -----------------------------------------------------------------------

/// One completed navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(serialize_with = "iso8601::serialize")]
    pub timestamp: DateTime<Utc>,
    /// Always at least 1.
    pub visit_count: u32,
}

impl HistoryEntry {
    /// Create an entry stamped now with a fresh id. An empty title is
    /// replaced by the URL.
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            id: new_id(),
            url: url.to_string(),
            title: if title.is_empty() { url } else { title }.to_string(),
            timestamp: Utc::now(),
            visit_count: 1,
        }
    }
}

impl Default for HistoryEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            url: String::new(),
            title: String::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            visit_count: 1,
        }
    }
}

impl<'de> Deserialize<'de> for HistoryEntry {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let fields = Fields::deserialize(d)?;
        let mut entry = Self::default();
        fields.read("id", &mut entry.id);
        fields.read("url", &mut entry.url);
        fields.read("title", &mut entry.title);
        if let Some(ts) = fields.timestamp("timestamp") {
            entry.timestamp = ts;
        }
        if let Some(count) = fields.count("visitCount") {
            entry.visit_count = count.max(1);
        }
        Ok(entry)
    }
}

// -----------------------------------------------------------------------
// Bookmark
// -----------------------------------------------------------------------

/// A saved page, optionally grouped under a folder label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Stored as `""` when unset.
    #[serde(serialize_with = "serialize_folder")]
    pub folder: Option<String>,
    #[serde(serialize_with = "iso8601::serialize")]
    pub date_added: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(title: &str, url: &str, folder: Option<&str>) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            url: url.to_string(),
            folder: folder.map(str::to_string),
            date_added: Utc::now(),
        }
    }
}

impl Default for Bookmark {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            url: String::new(),
            folder: None,
            date_added: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl<'de> Deserialize<'de> for Bookmark {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let fields = Fields::deserialize(d)?;
        let mut bookmark = Self::default();
        fields.read("id", &mut bookmark.id);
        fields.read("title", &mut bookmark.title);
        fields.read("url", &mut bookmark.url);
        fields.read("folder", &mut bookmark.folder);
        bookmark.folder = bookmark.folder.filter(|label| !label.is_empty());
        if let Some(ts) = fields.timestamp("dateAdded") {
            bookmark.date_added = ts;
        }
        Ok(bookmark)
    }
}

/// Bookmarks seeded on first run (or when the bookmarks document is
/// unreadable).
pub fn default_bookmarks() -> Vec<Bookmark> {
    vec![
        Bookmark::new("Bing", "https://www.bing.com", None),
        Bookmark::new("GitHub", "https://www.github.com", Some("Development")),
    ]
}

// -----------------------------------------------------------------------
// Settings
// -----------------------------------------------------------------------

/// User-facing browser settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub home_page: String,
    /// Search engine name (`bing`, `google`, `duckduckgo`).
    pub search_engine: String,
    pub download_path: PathBuf,
    pub show_bookmarks_bar: bool,
    pub block_popups: bool,
    #[serde(rename = "enableJavaScript")]
    pub enable_javascript: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_page: "about:blank".to_string(),
            search_engine: "bing".to_string(),
            download_path: default_download_path(),
            show_bookmarks_bar: true,
            block_popups: true,
            enable_javascript: true,
            theme: "system".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let fields = Fields::deserialize(d)?;
        let mut settings = Self::default();
        fields.read("homePage", &mut settings.home_page);
        fields.read("searchEngine", &mut settings.search_engine);
        fields.read("downloadPath", &mut settings.download_path);
        fields.read("showBookmarksBar", &mut settings.show_bookmarks_bar);
        fields.read("blockPopups", &mut settings.block_popups);
        fields.read("enableJavaScript", &mut settings.enable_javascript);
        fields.read("theme", &mut settings.theme);
        Ok(settings)
    }
}

fn default_download_path() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_default()
}

/// Fresh opaque identifier for history entries, bookmarks and tabs.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// -----------------------------------------------------------------------
// Serde helpers
// -----------------------------------------------------------------------

/// The fields of one JSON object, read one at a time.
struct Fields(Map<String, Value>);

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Map::deserialize(d).map(Self)
    }
}

impl Fields {
    /// Overwrite `slot` with `key` when it is present and has the right type.
    fn read<T: DeserializeOwned>(&self, key: &str, slot: &mut T) {
        if let Some(value) = self.0.get(key).and_then(|v| T::deserialize(v).ok()) {
            *slot = value;
        }
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.0.get(key)?.as_str()?;
        Some(iso8601::parse(raw).unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
    }

    /// A non-negative count, given as a number or a numeric string.
    fn count(&self, key: &str) -> Option<u32> {
        let n = match self.0.get(key)? {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        Some(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

/// ISO-8601 timestamps. Written as RFC 3339 in UTC; read from RFC 3339 or
/// from offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC). Strings that
/// match neither become the Unix epoch rather than dropping the record.
mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

fn serialize_folder<S>(folder: &Option<String>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(folder.as_deref().unwrap_or(""))
}
