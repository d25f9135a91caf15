//! Resolves the network address a login attempt is attributed to.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use ipnet::IpNet;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Returns the client address for a request.
///
/// The socket peer is authoritative. The first `X-Forwarded-For` entry is
/// used only when the peer lies inside one of `trusted_proxies` and the entry
/// parses as an IP address.
pub fn resolve_client_address(
    peer: SocketAddr,
    headers: &HeaderMap,
    trusted_proxies: &[IpNet],
) -> IpAddr {
    let peer_ip = peer.ip().to_canonical();

    if !trusted_proxies.iter().any(|network| network.contains(&peer_ip)) {
        return peer_ip;
    }

    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
        .map_or(peer_ip, |address| address.to_canonical())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use axum::http::{HeaderMap, HeaderValue};
    use ipnet::IpNet;

    use super::resolve_client_address;

    fn peer(address: [u8; 4]) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::from(address), 51000))
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    fn proxies() -> Vec<IpNet> {
        vec!["10.0.0.0/8".parse().unwrap_or_else(|_| panic!("static cidr"))]
    }

    #[test]
    fn untrusted_peer_ignores_forwarded_header() {
        let address =
            resolve_client_address(peer([203, 0, 113, 9]), &forwarded("1.2.3.4"), &proxies());
        assert_eq!(address, IpAddr::from([203, 0, 113, 9]));
    }

    #[test]
    fn trusted_peer_uses_first_forwarded_entry() {
        let address = resolve_client_address(
            peer([10, 1, 2, 3]),
            &forwarded("1.2.3.4, 10.1.2.3"),
            &proxies(),
        );
        assert_eq!(address, IpAddr::from([1, 2, 3, 4]));
    }

    #[test]
    fn trusted_peer_without_header_is_used_directly() {
        let address = resolve_client_address(peer([10, 1, 2, 3]), &HeaderMap::new(), &proxies());
        assert_eq!(address, IpAddr::from([10, 1, 2, 3]));
    }

    #[test]
    fn garbage_forwarded_entry_falls_back_to_peer() {
        let address =
            resolve_client_address(peer([10, 1, 2, 3]), &forwarded("unknown"), &proxies());
        assert_eq!(address, IpAddr::from([10, 1, 2, 3]));
    }

    #[test]
    fn ipv4_mapped_peer_is_canonicalised() {
        let mapped = SocketAddr::from((Ipv4Addr::new(198, 51, 100, 4).to_ipv6_mapped(), 443));
        let address = resolve_client_address(mapped, &HeaderMap::new(), &[]);
        assert_eq!(address, IpAddr::from([198, 51, 100, 4]));
    }
}
