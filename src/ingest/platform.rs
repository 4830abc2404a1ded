//! Platform detection from a URL's host

use serde::Serialize;
use std::fmt;
use url::Url;

/// Video hosting service a URL belongs to.
///
/// `Other` marks a parseable URL on an unrecognized host; extraction is
/// still attempted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    YouTube,
    Dailymotion,
    Vimeo,
    TikTok,
    Twitch,
    Facebook,
    Instagram,
    Twitter,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Dailymotion => "Dailymotion",
            Platform::Vimeo => "Vimeo",
            Platform::TikTok => "TikTok",
            Platform::Twitch => "Twitch",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::Other => "Other",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "YouTube" => Some(Platform::YouTube),
            "Dailymotion" => Some(Platform::Dailymotion),
            "Vimeo" => Some(Platform::Vimeo),
            "TikTok" => Some(Platform::TikTok),
            "Twitch" => Some(Platform::Twitch),
            "Facebook" => Some(Platform::Facebook),
            "Instagram" => Some(Platform::Instagram),
            "Twitter" => Some(Platform::Twitter),
            "Other" => Some(Platform::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known domains, including link-shortener domains
const PLATFORM_DOMAINS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("dailymotion.com", Platform::Dailymotion),
    ("dai.ly", Platform::Dailymotion),
    ("vimeo.com", Platform::Vimeo),
    ("tiktok.com", Platform::TikTok),
    ("twitch.tv", Platform::Twitch),
    ("facebook.com", Platform::Facebook),
    ("instagram.com", Platform::Instagram),
    ("twitter.com", Platform::Twitter),
    ("x.com", Platform::Twitter),
];

/// Mobile and canonical subdomain variants that map to the bare domain
const STRIPPED_PREFIXES: &[&str] = &["www.", "m."];

/// Detect the platform for a raw URL string.
///
/// Returns `None` when the string does not parse into scheme + host, and
/// `Some(Platform::Other)` for a valid URL on a host outside the table.
pub fn detect_platform(url: &str) -> Option<Platform> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(platform_for_host(host))
}

/// Map a host to its platform; unrecognized hosts yield `Platform::Other`.
pub fn platform_for_host(host: &str) -> Platform {
    let host = host.to_ascii_lowercase();
    match_domain(strip_prefixes(&host), PLATFORM_DOMAINS).unwrap_or(Platform::Other)
}

fn strip_prefixes(host: &str) -> &str {
    let mut host = host.trim_end_matches('.');
    while let Some(rest) = STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
    {
        host = rest;
    }
    host
}

/// Longest table domain that equals `host` or is a dot-separated suffix of it.
fn match_domain(host: &str, table: &[(&str, Platform)]) -> Option<Platform> {
    table
        .iter()
        .filter(|(domain, _)| {
            host == *domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|rest| rest.ends_with('.'))
        })
        .max_by_key(|(domain, _)| domain.len())
        .map(|(_, platform)| *platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_and_short_link_domains_map_to_same_platform() {
        let cases = [
            ("https://www.youtube.com/watch?v=abc123", Platform::YouTube),
            ("https://m.youtube.com/watch?v=abc123", Platform::YouTube),
            ("https://youtube.com/shorts/abc123", Platform::YouTube),
            ("https://youtu.be/abc123", Platform::YouTube),
            ("https://www.dailymotion.com/video/x8abc", Platform::Dailymotion),
            ("https://dai.ly/x8abc", Platform::Dailymotion),
            ("https://vimeo.com/123456", Platform::Vimeo),
            ("https://www.tiktok.com/@user/video/1", Platform::TikTok),
            ("https://m.twitch.tv/videos/1", Platform::Twitch),
            ("https://m.facebook.com/watch/?v=1", Platform::Facebook),
            ("https://www.instagram.com/reel/abc/", Platform::Instagram),
            ("https://twitter.com/user/status/1", Platform::Twitter),
            ("https://x.com/user/status/1", Platform::Twitter),
        ];

        for (url, expected) in cases {
            assert_eq!(detect_platform(url), Some(expected), "{url}");
        }
    }

    #[test]
    fn host_matching_ignores_case_and_trailing_dot() {
        assert_eq!(
            detect_platform("https://WWW.YouTube.COM./watch?v=1"),
            Some(Platform::YouTube)
        );
    }

    #[test]
    fn nested_subdomains_of_a_known_domain_match() {
        assert_eq!(
            detect_platform("https://player.vimeo.com/video/1"),
            Some(Platform::Vimeo)
        );
    }

    #[test]
    fn lookalike_hosts_are_not_matched_by_substring() {
        assert_eq!(detect_platform("https://box.com/v/1"), Some(Platform::Other));
        assert_eq!(
            detect_platform("https://notyoutube.com/watch"),
            Some(Platform::Other)
        );
        assert_eq!(
            detect_platform("https://youtube.com.evil.example/watch"),
            Some(Platform::Other)
        );
    }

    #[test]
    fn unknown_host_is_other_not_failure() {
        assert_eq!(
            detect_platform("https://unknownsite.example/clip/my-clip-name"),
            Some(Platform::Other)
        );
    }

    #[test]
    fn unparseable_or_hostless_input_is_detection_failure() {
        assert_eq!(detect_platform(""), None);
        assert_eq!(detect_platform("not a url"), None);
        assert_eq!(detect_platform("youtube.com/watch?v=1"), None);
        assert_eq!(detect_platform("mailto:someone@youtube.com"), None);
        assert_eq!(detect_platform("file:///tmp/video.mp4"), None);
    }

    #[test]
    fn bare_prefix_host_is_not_stripped_to_empty() {
        assert_eq!(strip_prefixes("www."), "www");
        assert_eq!(strip_prefixes("m.www.youtube.com"), "youtube.com");
    }

    #[test]
    fn longest_matching_domain_wins() {
        let table = [
            ("video.example", Platform::Vimeo),
            ("clips.video.example", Platform::Twitch),
        ];
        assert_eq!(
            match_domain("clips.video.example", &table),
            Some(Platform::Twitch)
        );
        assert_eq!(
            match_domain("a.clips.video.example", &table),
            Some(Platform::Twitch)
        );
        assert_eq!(
            match_domain("other.video.example", &table),
            Some(Platform::Vimeo)
        );
        assert_eq!(match_domain("example", &table), None);
    }

    #[test]
    fn database_strings_round_trip() {
        for (_, platform) in PLATFORM_DOMAINS {
            assert_eq!(Platform::parse(platform.as_str()), Some(*platform));
        }
        assert_eq!(Platform::parse("Other"), Some(Platform::Other));
        assert_eq!(Platform::parse("MySpace"), None);
    }
}
