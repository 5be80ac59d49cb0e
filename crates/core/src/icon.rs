//! Category icon URL handling.

use url::Url;

/// Resolve a stored icon reference.
///
/// Absolute `http(s)` URLs are kept as-is, relative paths are resolved
/// against the site's public base URL, and blank or unparsable values
/// yield `None`.
pub fn normalize_icon_url(raw: &str, base: &Url) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.starts_with("http://") || s.starts_with("https://") {
        return Some(s.to_string());
    }
    base.join(s).ok().map(String::from)
}

/// [`normalize_icon_url`] with a fallback.
pub fn icon_or_default(raw: Option<&str>, base: &Url, default: &str) -> String {
    raw.and_then(|r| normalize_icon_url(r, base))
        .unwrap_or_else(|| default.to_string())
}
