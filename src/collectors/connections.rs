use crate::state::Connection;
#[cfg(target_os = "linux")]
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

const TCP_ESTABLISHED: &str = "01";

/// Established TCP connections with a remote peer, at most `limit`.
#[cfg(target_os = "linux")]
pub fn established_connections(limit: usize) -> Vec<Connection> {
    let mut out = Vec::new();
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let Ok(text) = fs::read_to_string(table) else {
            continue;
        };
        out.extend(parse_tcp_table(&text));
        if out.len() >= limit {
            break;
        }
    }
    out.truncate(limit);
    out
}

#[cfg(not(target_os = "linux"))]
pub fn established_connections(_limit: usize) -> Vec<Connection> {
    Vec::new()
}

pub fn parse_tcp_table(text: &str) -> Vec<Connection> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 || parts[3] != TCP_ESTABLISHED {
                return None;
            }
            let local = parse_endpoint(parts[1])?;
            let remote = parse_endpoint(parts[2])?;
            if remote.ip().is_unspecified() && remote.port() == 0 {
                return None;
            }
            Some(Connection {
                local: local.to_string(),
                remote: remote.to_string(),
            })
        })
        .collect()
}

// "0100007F:1F90" -> 127.0.0.1:8080; address words are in host byte order.
fn parse_endpoint(raw: &str) -> Option<SocketAddr> {
    let (addr_hex, port_hex) = raw.split_once(':')?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let ip = match addr_hex.len() {
        8 => {
            let word = u32::from_str_radix(addr_hex, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_le_bytes()))
        }
        32 => {
            let mut octets = [0_u8; 16];
            for (i, chunk) in octets.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(addr_hex.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}
