//! Ethernet II / IPv4 / TCP payload extraction and the canonical
//! session key. Anything that is not well-formed IPv4-over-Ethernet TCP
//! within the captured length is reported as a parse failure and
//! skipped upstream.

use crate::error::{PtridError, Result};
use std::net::Ipv4Addr;

pub const ETHERNET_HEADER_LEN: usize = 14;

/// EtherType bytes `08 00` as read from the wire into a little-endian
/// u16. The check deliberately stays in wire byte order; captured
/// Ethernet II traces carry exactly this value for IPv4.
pub const ETHERTYPE_IPV4_WIRE: u16 = 0x0008;

pub const IP_PROTOCOL_TCP: u8 = 6;

pub const TCP_FIN: u8 = 0x01;
pub const TCP_RST: u8 = 0x04;

/// Canonicalized TCP 4-tuple: both directions of a conversation order
/// to the same key, by IP first and port second.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SessionKey {
    ip_lo: Ipv4Addr,
    port_lo: u16,
    ip_hi: Ipv4Addr,
    port_hi: u16,
}

impl SessionKey {
    pub fn new(ip_a: Ipv4Addr, port_a: u16, ip_b: Ipv4Addr, port_b: u16) -> Self {
        if ip_a < ip_b || (ip_a == ip_b && port_a <= port_b) {
            Self {
                ip_lo: ip_a,
                port_lo: port_a,
                ip_hi: ip_b,
                port_hi: port_b,
            }
        } else {
            Self {
                ip_lo: ip_b,
                port_lo: port_b,
                ip_hi: ip_a,
                port_hi: port_a,
            }
        }
    }
}

/// TCP payload slice of one captured frame plus its session
/// coordinates.
#[derive(Debug)]
pub struct TcpSegment<'a> {
    pub key: SessionKey,
    pub flags: u8,
    pub payload: &'a [u8],
}

/// Extracts the TCP payload of an Ethernet II / IPv4 / TCP frame.
/// `caplen` is the captured length from the pcap record header; the
/// payload runs from the end of the TCP header to the captured end.
pub fn extract_tcp_payload(data: &[u8], caplen: usize) -> Result<TcpSegment<'_>> {
    let frame = &data[..caplen.min(data.len())];
    if frame.len() < ETHERNET_HEADER_LEN + 20 {
        return Err(PtridError::PacketParse(
            "frame shorter than Ethernet and IPv4 headers",
        ));
    }

    let ethertype = u16::from_le_bytes([frame[12], frame[13]]);
    if ethertype != ETHERTYPE_IPV4_WIRE {
        return Err(PtridError::PacketParse("not IPv4 over Ethernet II"));
    }

    let ip = &frame[ETHERNET_HEADER_LEN..];
    let header_len = (ip[0] & 0x0f) as usize * 4;
    if header_len < 20 || ip.len() < header_len {
        return Err(PtridError::PacketParse("truncated IPv4 header"));
    }
    if ip[9] != IP_PROTOCOL_TCP {
        return Err(PtridError::PacketParse("not TCP"));
    }
    let src = Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]);
    let dst = Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]);

    let tcp = &ip[header_len..];
    if tcp.len() < 20 {
        return Err(PtridError::PacketParse("truncated TCP header"));
    }
    let src_port = u16::from_be_bytes([tcp[0], tcp[1]]);
    let dst_port = u16::from_be_bytes([tcp[2], tcp[3]]);
    let data_offset = ((tcp[12] >> 4) as usize) * 4;
    if data_offset < 20 || tcp.len() < data_offset {
        return Err(PtridError::PacketParse(
            "TCP data offset past the captured bytes",
        ));
    }

    Ok(TcpSegment {
        key: SessionKey::new(src, src_port, dst, dst_port),
        flags: tcp[13],
        payload: &tcp[data_offset..],
    })
}
