//! Text and URL clean-up for backend fields.

use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Strips markup tags and unescapes `&quot;`.
///
/// No other entities are touched.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    tag_regex().replace_all(raw, "").replace("&quot;", "\"")
}

/// Replaces the first literal space with `+`.
///
/// The backend occasionally returns URLs with an unencoded space; this is not
/// a general URL canonicalizer.
pub fn normalize_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    url.replacen(' ', "+", 1)
}
