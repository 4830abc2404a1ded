//! Local, network-free URL gate in front of extraction

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

use super::platform::detect_platform;
use crate::constants::MIN_URL_LENGTH;

/// Whether `url` is worth handing to the extractor.
///
/// Pure and fast: requires an absolute http(s) URL on a public-looking
/// host that platform detection accepts. Never touches the network.
pub fn is_valid_video_url(url: &str) -> bool {
    if url.trim().is_empty() || url.chars().count() < MIN_URL_LENGTH {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    match parsed.host() {
        Some(host) if !is_internal_host(&host) => {}
        _ => return false,
    }

    detect_platform(url).is_some()
}

/// Hosts the extractor must never be pointed at
fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain.is_empty()
                || domain == "localhost"
                || domain.ends_with(".localhost")
                || domain.ends_with(".local")
                || domain.ends_with(".internal")
        }
        Host::Ipv4(ip) => is_private_ipv4(ip),
        Host::Ipv6(ip) => is_private_ipv6(ip),
    }
}

fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_multicast()
}

fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || first & 0xffc0 == 0xfe80
        || first & 0xfe00 == 0xfc00
}
