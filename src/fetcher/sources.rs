//! Source list parsing and browser-URL to raw-URL translation.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::sync::OnceLock;

/// Everything except RFC 3986 unreserved characters, so `/` is encoded too.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Hosting platform, which decides how an access token is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    GitHub,
    GitLab,
    Unknown,
}

/// Split a comma and/or whitespace separated source list.
pub fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn detect_platform(url: &str) -> Platform {
    if url.contains("github.com") || url.contains("raw.githubusercontent.com") {
        Platform::GitHub
    } else if url.contains("/-/blob/") || url.contains("/-/raw/") || url.contains("/api/v4/projects/")
    {
        Platform::GitLab
    } else {
        Platform::Unknown
    }
}

fn github_blob() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://github\.com/([^/]+/[^/]+)/blob/([^/]+)/(.+)$")
            .expect("github blob pattern is valid")
    })
}

fn gitlab_blob() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(https?://[^/]+)/(.+?)/-/blob/([^/]+)/(.+)$")
            .expect("gitlab blob pattern is valid")
    })
}

fn already_raw() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(raw\.githubusercontent\.com/.+|[^/]+/.+/-/raw/.+)$")
            .expect("raw url pattern is valid")
    })
}

/// Rewrite a GitHub or GitLab blob URL into one that serves the file contents.
/// Other URLs are returned unchanged.
pub fn to_raw_url(url: &str) -> String {
    if already_raw().is_match(url) {
        return url.to_string();
    }

    if let Some(caps) = github_blob().captures(url) {
        return format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            &caps[1], &caps[2], &caps[3]
        );
    }

    if let Some(caps) = gitlab_blob().captures(url) {
        return format!(
            "{}/api/v4/projects/{}/repository/files/{}/raw?ref={}",
            &caps[1],
            utf8_percent_encode(&caps[2], PATH_SEGMENT),
            utf8_percent_encode(&caps[4], PATH_SEGMENT),
            &caps[3]
        );
    }

    url.to_string()
}
