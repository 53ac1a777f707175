//! URL comparison helpers
//!
//! Tab matching and same-origin grouping compare URLs loosely: the scheme,
//! a trailing slash, the fragment and host casing (including a leading
//! `www.`) are ignored. Port, path and query still have to match.

use url::Url;

/// Scheme used for browser-internal pages.
pub const INTERNAL_SCHEME: &str = "internal";

const SESSION_RESTORE_PATH: &str = "/sessionrestore";

fn normalized_host(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_ascii_lowercase();
        match host.strip_prefix("www.") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => host,
        }
    })
}

fn trimmed_path(url: &Url) -> &str {
    let path = url.path();
    path.strip_suffix('/').unwrap_or(path)
}

/// Loose equality used for grouping and for finding an existing tab.
pub fn equivalent(a: &Url, b: &Url) -> bool {
    normalized_host(a) == normalized_host(b)
        && a.port() == b.port()
        && trimmed_path(a) == trimmed_path(b)
        && a.query() == b.query()
}

/// `about:blank`, left behind by links that open native apps.
pub fn is_blank(url: &Url) -> bool {
    url.scheme() == "about" && url.path() == "blank"
}

pub fn is_internal(url: &Url) -> bool {
    url.scheme() == INTERNAL_SCHEME
}

/// Internal page used while replaying a restored session history.
pub fn is_session_restore(url: &Url) -> bool {
    is_internal(url) && url.path().starts_with(SESSION_RESTORE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_ignores_scheme_slash_fragment_and_case() {
        assert!(equivalent(
            &url("https://www.NYTimes.com/section/"),
            &url("http://nytimes.com/section#top"),
        ));
        assert!(equivalent(&url("https://example.com"), &url("http://example.com/")));
    }

    #[test]
    fn test_distinguishes_path_query_and_port() {
        assert!(!equivalent(&url("https://a.com/x"), &url("https://a.com/y")));
        assert!(!equivalent(&url("https://a.com/?q=1"), &url("https://a.com/?q=2")));
        assert!(!equivalent(&url("https://a.com:8443/"), &url("https://a.com/")));
        assert!(!equivalent(&url("https://a.com/"), &url("https://b.com/")));
    }

    #[test]
    fn test_special_pages() {
        assert!(is_blank(&url("about:blank")));
        assert!(!is_blank(&url("https://blank.org")));
        assert!(is_session_restore(&url("internal://local/sessionrestore?history=1")));
        assert!(!is_session_restore(&url("internal://local/about/home")));
        assert!(is_internal(&url("internal://local/about/home")));
    }
}
