//! Client identity for rate limiting.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Key used when no identity signal is available.
pub const ANONYMOUS_KEY: &str = "anonymous";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Where the limiter takes the client identity from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKeySource {
    /// Transport peer address of the TCP connection.
    Peer,
    /// First hop of `X-Forwarded-For`. Only safe behind a proxy that overwrites the header.
    ForwardedFor,
}

/// Derives the limiter key for a request.
pub fn client_key(source: ClientKeySource, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let key = match source {
        ClientKeySource::Peer => peer.map(|addr| addr.ip().to_string()),
        ClientKeySource::ForwardedFor => headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    };
    key.unwrap_or_else(|| ANONYMOUS_KEY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_peer_source_ignores_forwarded_header() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let key = client_key(ClientKeySource::Peer, &forwarded("6.6.6.6"), Some(peer));
        assert_eq!(key, "10.0.0.7");
    }

    #[test]
    fn test_peer_port_does_not_split_clients() {
        let a: SocketAddr = "10.0.0.7:1".parse().unwrap();
        let b: SocketAddr = "10.0.0.7:2".parse().unwrap();
        let headers = HeaderMap::new();
        assert_eq!(
            client_key(ClientKeySource::Peer, &headers, Some(a)),
            client_key(ClientKeySource::Peer, &headers, Some(b))
        );
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let key = client_key(
            ClientKeySource::ForwardedFor,
            &forwarded("203.0.113.9, 10.0.0.1"),
            None,
        );
        assert_eq!(key, "203.0.113.9");
    }

    #[test]
    fn test_missing_signal_falls_back_to_placeholder() {
        let headers = HeaderMap::new();
        assert_eq!(client_key(ClientKeySource::ForwardedFor, &headers, None), ANONYMOUS_KEY);
        assert_eq!(client_key(ClientKeySource::Peer, &headers, None), ANONYMOUS_KEY);
    }
}
