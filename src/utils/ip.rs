//! Client address extraction
//!
//! Visits record the originating network address when one can be
//! determined. X-Forwarded-For / X-Real-IP are honored only when the direct
//! peer is a private or loopback address (i.e. a reverse proxy in front of
//! us); public peers cannot spoof their address through headers.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // fc00::/7 (ULA), fe80::/10 (link-local), ::1
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Extract the forwarded client IP from proxy headers, if any.
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

/// Best-effort client address for a request.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    let conn_info = req.connection_info();
    let peer_ip = conn_info.peer_addr()?;

    let peer_addr = if let Ok(socket_addr) = peer_ip.parse::<SocketAddr>() {
        Some(socket_addr.ip())
    } else {
        peer_ip.parse::<IpAddr>().ok()
    };

    if let Some(addr) = peer_addr
        && is_private_or_local(&addr)
        && let Some(forwarded) = extract_forwarded_ip_from_headers(req.headers())
    {
        return Some(forwarded);
    }

    Some(peer_ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};

    #[test]
    fn test_is_private_or_local_ipv4() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_is_private_or_local_ipv6() {
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_extract_forwarded_prefers_first_xff_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.9, 10.0.0.2"),
        );
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers),
            Some("203.0.113.9".to_string())
        );
    }

    #[test]
    fn test_extract_forwarded_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-real-ip"),
            HeaderValue::from_static("198.51.100.4"),
        );
        assert_eq!(
            extract_forwarded_ip_from_headers(&headers),
            Some("198.51.100.4".to_string())
        );
    }

    #[test]
    fn test_extract_forwarded_none_when_absent() {
        let headers = HeaderMap::new();
        assert_eq!(extract_forwarded_ip_from_headers(&headers), None);
    }
}
