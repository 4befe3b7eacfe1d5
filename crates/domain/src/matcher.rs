//! URL pattern matching for the filter dialects.
//!
//! Every function here fails closed: a URL or pattern that cannot be parsed
//! or compiled simply does not match. One broken filter must never stop the
//! evaluation of the others.

use regex::Regex;
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::filter::{MatchType, UrlFilter};

/// Hostname that `localhost_port` filters require.
const LOCALHOST: &str = "localhost";

/// Placeholder scheme used to parse bare hosts.
const PLACEHOLDER_SCHEME: &str = "http://";

/// Returns true if `tab_url` matches the filter's dialect and pattern.
///
/// The filter's `enabled` flag and include/exclude type are not consulted.
#[must_use]
pub fn matches(tab_url: &str, filter: &UrlFilter) -> bool {
    matches_pattern(tab_url, &filter.match_type, &filter.pattern)
}

/// Returns true if `tab_url` matches `pattern` under `match_type`.
#[must_use]
pub fn matches_pattern(tab_url: &str, match_type: &MatchType, pattern: &str) -> bool {
    Url::parse(tab_url).is_ok_and(|url| matches_url(&url, match_type, pattern))
}

/// Same as [`matches_pattern`] for an already parsed URL.
#[must_use]
pub fn matches_url(url: &Url, match_type: &MatchType, pattern: &str) -> bool {
    let pattern = pattern.trim();
    match match_type {
        MatchType::HostEquals => {
            host_of(url).is_some_and(|host| normalize_host(pattern).is_some_and(|p| host == p))
        }
        MatchType::HostEndsWith => host_of(url).is_some_and(|host| {
            normalize_host(pattern)
                .is_some_and(|p| host == p || host.ends_with(&format!(".{p}")))
        }),
        MatchType::UrlStartsWith => comparable_url(url, pattern).starts_with(pattern),
        MatchType::UrlContains => comparable_url(url, pattern).contains(pattern),
        MatchType::PathStartsWith => {
            if pattern.starts_with('/') {
                url.path().starts_with(pattern)
            } else {
                url.path().starts_with(&format!("/{pattern}"))
            }
        }
        MatchType::LocalhostPort => matches_localhost_port(url, pattern),
        MatchType::Regex => compile_regex(pattern).is_ok_and(|re| re.is_match(url.as_str())),
        MatchType::DnrUrlFilter | MatchType::Other(_) => {
            glob_to_regex(pattern).is_ok_and(|re| re.is_match(url.as_str()))
        }
    }
}

/// Extracts a lowercased hostname from user input.
///
/// Accepts a bare host, `host:port`, or a full URL. Bare input is parsed with
/// a placeholder scheme. Returns `None` when no host can be extracted, which
/// callers treat as "never matches".
#[must_use]
pub fn normalize_host(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let parsed = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("{PLACEHOLDER_SCHEME}{input}"))
    };
    let url = parsed.ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    (!host.is_empty()).then_some(host)
}

/// Converts a `*` glob into an anchored regular expression.
///
/// Every character other than `*` is matched literally.
///
/// # Errors
///
/// Returns an error if the resulting expression exceeds the regex size limit.
pub fn glob_to_regex(pattern: &str) -> DomainResult<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|e| DomainError::InvalidPattern(e.to_string()))
}

/// Compiles a user-supplied regular expression.
///
/// # Errors
///
/// Returns an error if the expression is not valid.
pub fn compile_regex(pattern: &str) -> DomainResult<Regex> {
    Regex::new(pattern).map_err(|e| DomainError::InvalidPattern(e.to_string()))
}

fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(str::to_ascii_lowercase)
}

/// Returns the string a prefix/substring pattern is compared against.
///
/// Patterns with a scheme see the whole URL; scheme-less patterns see
/// `host[:port] + path + ?query + #fragment`.
fn comparable_url(url: &Url, pattern: &str) -> String {
    if pattern.contains("://") {
        return url.as_str().to_string();
    }
    let mut out = String::new();
    if let Some(host) = url.host_str() {
        out.push_str(host);
    }
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path());
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Port constraint expressed by a `localhost_port` pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortSpec {
    Any,
    Exact(u16),
}

fn matches_localhost_port(url: &Url, pattern: &str) -> bool {
    if url.host_str() != Some(LOCALHOST) {
        return false;
    }
    if pattern.is_empty() {
        return true;
    }
    match parse_port_spec(pattern) {
        Some(PortSpec::Any) => true,
        Some(PortSpec::Exact(expected)) => url.port_or_known_default() == Some(expected),
        None => false,
    }
}

fn parse_port_spec(pattern: &str) -> Option<PortSpec> {
    if pattern.bytes().all(|b| b.is_ascii_digit()) {
        return pattern.parse().ok().map(PortSpec::Exact);
    }
    if pattern.contains("://") {
        let url = Url::parse(pattern).ok()?;
        if url.host_str() != Some(LOCALHOST) {
            return None;
        }
        return url.port_or_known_default().map(PortSpec::Exact);
    }

    let lowered = pattern.to_ascii_lowercase();
    let rest = lowered.strip_prefix(LOCALHOST)?;
    let rest = rest.split('/').next().unwrap_or_default();
    if rest.is_empty() {
        return Some(PortSpec::Any);
    }
    rest.strip_prefix(':')?.parse().ok().map(PortSpec::Exact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str, match_type: MatchType, pattern: &str) -> bool {
        matches_pattern(url, &match_type, pattern)
    }

    #[test]
    fn host_equals_is_exact() {
        assert!(!check("https://api.example.com/v1", MatchType::HostEquals, "example.com"));
        assert!(check("https://example.com/v1", MatchType::HostEquals, "example.com"));
        assert!(check("https://example.com:8443/", MatchType::HostEquals, "EXAMPLE.com:9000"));
        assert!(check("https://example.com/", MatchType::HostEquals, "https://example.com/path"));
    }

    #[test]
    fn host_ends_with_requires_label_boundary() {
        assert!(check("https://api.example.com/v1", MatchType::HostEndsWith, "example.com"));
        assert!(check("https://example.com/", MatchType::HostEndsWith, "example.com"));
        assert!(!check("https://evil-example.com/", MatchType::HostEndsWith, "example.com"));
    }

    #[test]
    fn url_prefix_without_scheme_ignores_scheme() {
        let url = "https://example.com:8080/api/users?page=2#top";
        assert!(check(url, MatchType::UrlStartsWith, "example.com:8080/api"));
        assert!(!check(url, MatchType::UrlStartsWith, "http://example.com"));
        assert!(check(url, MatchType::UrlStartsWith, "https://example.com:8080/api"));
        assert!(check(url, MatchType::UrlContains, "users?page=2#top"));
        assert!(check(url, MatchType::UrlContains, "https://"));
        assert!(!check(url, MatchType::UrlContains, "https:/"));
    }

    #[test]
    fn path_prefix_adds_leading_slash() {
        assert!(check("https://example.com/api/v1", MatchType::PathStartsWith, "api"));
        assert!(check("https://example.com/api/v1", MatchType::PathStartsWith, "/api/v1"));
        assert!(!check("https://example.com/web/api", MatchType::PathStartsWith, "api"));
    }

    #[test]
    fn localhost_port_variants() {
        let url = "http://localhost:3000/x";
        assert!(check(url, MatchType::LocalhostPort, "3000"));
        assert!(!check(url, MatchType::LocalhostPort, "8080"));
        assert!(check(url, MatchType::LocalhostPort, ""));
        assert!(check("http://localhost:9999/", MatchType::LocalhostPort, ""));
        assert!(check(url, MatchType::LocalhostPort, "localhost:3000"));
        assert!(check(url, MatchType::LocalhostPort, "http://localhost:3000"));
        assert!(check(url, MatchType::LocalhostPort, "localhost"));
        assert!(!check("http://127.0.0.1:3000/", MatchType::LocalhostPort, "3000"));
    }

    #[test]
    fn localhost_port_falls_back_to_scheme_default() {
        assert!(check("http://localhost/", MatchType::LocalhostPort, "80"));
        assert!(check("https://localhost/", MatchType::LocalhostPort, "443"));
        assert!(check("https://localhost/", MatchType::LocalhostPort, "https://localhost"));
        assert!(!check("http://localhost/", MatchType::LocalhostPort, "https://localhost"));
    }

    #[test]
    fn invalid_inputs_fail_closed() {
        assert!(!check("not a url", MatchType::DnrUrlFilter, "*"));
        assert!(!check("https://example.com/", MatchType::Regex, "(unclosed"));
        assert!(!check("https://example.com/", MatchType::HostEquals, "http://"));
        assert!(!check("https://example.com/", MatchType::LocalhostPort, "abc"));
    }

    #[test]
    fn regex_tests_full_url() {
        assert!(check("https://example.com/a/b", MatchType::Regex, r"^https://.*\.com/a"));
        assert!(!check("https://example.com/a/b", MatchType::Regex, r"^http://"));
    }

    #[test]
    fn glob_escapes_metacharacters() {
        assert!(check("https://example.com/a?b=1", MatchType::DnrUrlFilter, "https://example.com/a?b=*"));
        assert!(!check("https://exampleXcom/", MatchType::DnrUrlFilter, "https://example.com/"));
        assert!(check("https://sub.example.com/x", MatchType::DnrUrlFilter, "*://*.example.com/*"));
        assert!(!check("https://example.com/x", MatchType::DnrUrlFilter, "example.com"));
    }

    #[test]
    fn unknown_dialect_behaves_like_glob() {
        let other = MatchType::Other("legacy".to_string());
        assert!(check("https://example.com/x", other.clone(), "*example.com*"));
        assert!(!check("https://example.org/x", other, "*example.com*"));
    }

    #[test]
    fn normalize_host_handles_all_shapes() {
        assert_eq!(normalize_host("Example.COM"), Some("example.com".to_string()));
        assert_eq!(normalize_host("example.com:8080"), Some("example.com".to_string()));
        assert_eq!(normalize_host("https://Api.Example.com/x"), Some("api.example.com".to_string()));
        assert_eq!(normalize_host("   "), None);
        assert_eq!(normalize_host("http://"), None);
    }
}
