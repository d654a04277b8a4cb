//! Address-bar classification.
//!
//! Decides what the user meant by a line of address-bar text: a local or
//! private-network target, an absolute URL, a bare domain, or a search.
//! This is an intent heuristic, not a URL parser. Nothing here fails;
//! odd input degrades to a host guess or to a search query.

use std::net::{IpAddr, Ipv6Addr};

use crate::search::SearchEngine;

/// Schemes that [`ensure_scheme`] leaves untouched.
const KNOWN_PREFIXES: [&str; 4] = ["http://", "https://", "file://", "about:"];

// -----------------------------------------------------------------------
// Classification
// -----------------------------------------------------------------------

/// What a line of address-bar text resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Blank input. The caller must not navigate.
    Empty,
    /// `localhost`, a loopback literal or a private-range IP. Holds the
    /// trimmed input; [`navigation_url`](Self::navigation_url) adds `http://`.
    LocalOrPrivate(String),
    /// Input that already parses as an absolute URL, scheme kept as typed.
    DirectUrl(String),
    /// Something that looks like a domain, already prefixed with `https://`.
    LikelyDomain(String),
    /// Free text, with the results URL for the configured engine.
    SearchQuery { term: String, search_url: String },
}

impl Classification {
    /// The URL the engine should load, or `None` for blank input.
    pub fn navigation_url(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::LocalOrPrivate(input) => Some(ensure_scheme(input)),
            Self::DirectUrl(url) | Self::LikelyDomain(url) => Some(url.clone()),
            Self::SearchQuery { search_url, .. } => Some(search_url.clone()),
        }
    }

    /// The search term when this is a search.
    pub fn search_term(&self) -> Option<&str> {
        match self {
            Self::SearchQuery { term, .. } => Some(term),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------
// AddressClassifier
// -----------------------------------------------------------------------

/// Classifies address-bar input against a search engine.
#[derive(Debug, Clone, Default)]
pub struct AddressClassifier {
    engine: SearchEngine,
}

impl AddressClassifier {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> SearchEngine {
        self.engine
    }

    pub fn set_engine(&mut self, engine: SearchEngine) {
        self.engine = engine;
    }

    /// Classify `raw`. Checks run in order and the first match wins:
    /// local/private host, absolute URL, domain-like text, search.
    pub fn classify(&self, raw: &str) -> Classification {
        let input = raw.trim();
        let result = if input.is_empty() {
            Classification::Empty
        } else if is_local_or_private(input) {
            Classification::LocalOrPrivate(input.to_string())
        } else if is_direct_url(input) {
            Classification::DirectUrl(input.to_string())
        } else if is_likely_domain(input) {
            Classification::LikelyDomain(prefix_https(input))
        } else {
            Classification::SearchQuery {
                term: input.to_string(),
                search_url: self.engine.search_url(input),
            }
        };
        log::debug!("classified {input:?} as {result:?}");
        result
    }
}

// -----------------------------------------------------------------------
// Heuristics
// -----------------------------------------------------------------------

/// Approximate the host of `input`: the text before the first `/`, then
/// before the first `?`, then before the first `:`, lower-cased.
///
/// IPv6 literals are kept intact: `[::1]:8080` yields `[::1]` and a bare
/// `fe80::1` yields itself. If the cuts leave nothing, the whole trimmed
/// input is used.
pub fn extract_host(input: &str) -> String {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix('[')
        && let Some(end) = rest.find(']')
    {
        return input[..end + 2].to_lowercase();
    }

    let authority = input.split('/').next().unwrap_or(input);
    let authority = authority.split('?').next().unwrap_or(authority);
    if authority.parse::<Ipv6Addr>().is_ok() {
        return authority.to_lowercase();
    }

    let host = authority.split(':').next().unwrap_or(authority);
    if host.is_empty() {
        input.to_lowercase()
    } else {
        host.to_lowercase()
    }
}

/// True when `input` names localhost, a loopback literal or a
/// private-network IP.
pub fn is_local_or_private(input: &str) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    let host = extract_host(input);

    if host == "localhost" || host.starts_with("localhost.") {
        return true;
    }
    if matches!(host.as_str(), "127.0.0.1" | "::1" | "[::1]") {
        return true;
    }

    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(&host);
    literal
        .parse::<IpAddr>()
        .is_ok_and(|ip| is_private_ip(ip) || ip.is_loopback())
}

/// Private-network ranges: RFC 1918 (`10/8`, `172.16/12`, `192.168/16`),
/// IPv4 link-local `169.254/16`, IPv6 loopback, link-local `fe80::/10` and
/// unique-local `fc00::/7`.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let link_local = v6.segments()[0] & 0xffc0 == 0xfe80;
            let unique_local = v6.octets()[0] & 0xfe == 0xfc;
            v6.is_loopback() || link_local || unique_local
        },
    }
}

/// True when `input` parses as an absolute URL with a real scheme.
///
/// `host.tld:port` also parses, with the host as its scheme. A scheme with
/// a dot in it, or one followed only by digits, is a host and port instead.
pub fn is_direct_url(input: &str) -> bool {
    let Ok(url) = url::Url::parse(input) else {
        return false;
    };
    let scheme = url.scheme();
    let rest = &url.as_str()[scheme.len()..];
    let port_only = rest
        .strip_prefix(':')
        .and_then(|tail| tail.split('/').next())
        .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()));
    !scheme.is_empty() && !scheme.contains('.') && !port_only
}

/// Contains a dot and no whitespace.
pub fn is_likely_domain(input: &str) -> bool {
    input.contains('.') && !input.chars().any(char::is_whitespace)
}

/// Prefix `https://` unless the input already starts with `http`.
pub(crate) fn prefix_https(input: &str) -> String {
    if input.starts_with("http") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

/// Give a scheme-less target a scheme: `http://` for local and private
/// hosts (intranet and dev servers rarely have TLS), `https://` for
/// everything else. Inputs already carrying `http://`, `https://`,
/// `file://` or `about:` are returned unchanged; blank input becomes
/// `about:blank`.
pub fn ensure_scheme(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return "about:blank".to_string();
    }
    if KNOWN_PREFIXES.iter().any(|p| input.starts_with(p)) {
        return input.to_string();
    }
    if is_local_or_private(input) {
        format!("http://{input}")
    } else {
        format!("https://{input}")
    }
}
