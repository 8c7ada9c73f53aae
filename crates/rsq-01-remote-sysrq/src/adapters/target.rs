//! # Packet-Filter Target Glue
//!
//! Locates the UDP payload inside a raw IPv4 or IPv6 packet and hands it to
//! a [`RemoteSysrqApi`]. Rules may only bind the target to UDP or UDP-Lite.
//!
//! The UDP-Lite payload length is taken from the IP header, since its UDP
//! length field carries checksum coverage instead. IPv6 extension headers
//! are not walked; packets carrying them DROP unless the host strips them
//! before calling [`SysrqTarget::handle_ipv6`].

use shared_types::{AddressFamily, IpProtocol, Verdict};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::domain::errors::SetupError;
use crate::ports::inbound::RemoteSysrqApi;

const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV6_HEADER_LEN: usize = 40;
const UDP_HEADER_LEN: usize = 8;

/// The parts of a filter rule the target cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleEntry {
    pub family: AddressFamily,
    pub protocol: IpProtocol,
    pub protocol_inverted: bool,
}

impl RuleEntry {
    pub fn udp(family: AddressFamily) -> Self {
        Self {
            family,
            protocol: IpProtocol::UDP,
            protocol_inverted: false,
        }
    }
}

/// Reject rules that could feed non-UDP traffic to the validator.
pub fn check_entry(entry: &RuleEntry) -> Result<(), SetupError> {
    if entry.protocol_inverted {
        return Err(shared_types::TransportError::InvertedProtocol.into());
    }
    entry.protocol.require_udp_like()?;
    Ok(())
}

/// Source/destination view of a UDP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram<'a, A> {
    pub source: A,
    pub destination: A,
    pub source_port: u16,
    pub destination_port: u16,
    pub payload: &'a [u8],
}

/// Split a UDP or UDP-Lite header off `transport`.
///
/// For UDP the datagram length comes from the UDP length field. UDP-Lite
/// reuses that field as checksum coverage, so its length is
/// `ip_datagram_len`, the transport length declared by the IP header. Either
/// way the payload is bounded by the bytes actually present.
fn udp_payload(
    protocol: IpProtocol,
    transport: &[u8],
    ip_datagram_len: usize,
) -> Option<(u16, u16, &[u8])> {
    if transport.len() < UDP_HEADER_LEN {
        return None;
    }
    let source_port = u16::from_be_bytes([transport[0], transport[1]]);
    let destination_port = u16::from_be_bytes([transport[2], transport[3]]);
    let datagram_len = if protocol == IpProtocol::UDPLITE {
        ip_datagram_len
    } else {
        usize::from(u16::from_be_bytes([transport[4], transport[5]]))
    };
    let declared = datagram_len.checked_sub(UDP_HEADER_LEN)?;
    let body = &transport[UDP_HEADER_LEN..];
    Some((source_port, destination_port, &body[..declared.min(body.len())]))
}

/// Extract the UDP payload from an IPv4 packet.
///
/// Returns `None` for non-IPv4 input, a bad header length, a transport other
/// than UDP/UDP-Lite, or a datagram length below the UDP header size.
pub fn udp_payload_ipv4(packet: &[u8]) -> Option<Datagram<'_, Ipv4Addr>> {
    if packet.len() < IPV4_MIN_HEADER_LEN || packet[0] >> 4 != 4 {
        return None;
    }
    let header_len = usize::from(packet[0] & 0x0f) * 4;
    if header_len < IPV4_MIN_HEADER_LEN || packet.len() < header_len {
        return None;
    }
    let protocol = IpProtocol(packet[9]);
    if !protocol.is_udp_like() {
        return None;
    }
    let total_len = usize::from(u16::from_be_bytes([packet[2], packet[3]]));

    let source = Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]);
    let destination = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
    let (source_port, destination_port, payload) = udp_payload(
        protocol,
        &packet[header_len..],
        total_len.saturating_sub(header_len),
    )?;
    Some(Datagram {
        source,
        destination,
        source_port,
        destination_port,
        payload,
    })
}

/// Extract the UDP payload from an IPv6 packet whose next header is UDP or
/// UDP-Lite.
///
/// Extension headers are not walked: a packet whose fixed header is followed
/// by anything other than the transport header yields `None`. Hosts that
/// receive such traffic must defragment and strip extension headers first.
pub fn udp_payload_ipv6(packet: &[u8]) -> Option<Datagram<'_, Ipv6Addr>> {
    if packet.len() < IPV6_HEADER_LEN || packet[0] >> 4 != 6 {
        return None;
    }
    let protocol = IpProtocol(packet[6]);
    if !protocol.is_udp_like() {
        return None;
    }
    let payload_len = usize::from(u16::from_be_bytes([packet[4], packet[5]]));

    let mut source = [0u8; 16];
    let mut destination = [0u8; 16];
    source.copy_from_slice(&packet[8..24]);
    destination.copy_from_slice(&packet[24..40]);
    let (source_port, destination_port, payload) =
        udp_payload(protocol, &packet[IPV6_HEADER_LEN..], payload_len)?;
    Some(Datagram {
        source: Ipv6Addr::from(source),
        destination: Ipv6Addr::from(destination),
        source_port,
        destination_port,
        payload,
    })
}

/// A validator bound to one filter rule.
#[derive(Debug)]
pub struct SysrqTarget<A: RemoteSysrqApi> {
    entry: RuleEntry,
    api: A,
    debug: bool,
}

impl<A: RemoteSysrqApi> SysrqTarget<A> {
    /// Bind `api` to `entry`, failing if the rule is not UDP-only.
    pub fn install(entry: RuleEntry, api: A) -> Result<Self, SetupError> {
        check_entry(&entry)?;
        Ok(Self {
            entry,
            api,
            debug: false,
        })
    }

    /// Log every datagram reaching the target.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn entry(&self) -> &RuleEntry {
        &self.entry
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run an IPv4 packet through the validator.
    pub fn handle_ipv4(&self, packet: &[u8]) -> Verdict {
        match udp_payload_ipv4(packet) {
            Some(datagram) => self.handle(&datagram),
            None => Verdict::Drop,
        }
    }

    /// Run an IPv6 packet through the validator.
    ///
    /// The transport header must directly follow the fixed IPv6 header;
    /// packets with extension headers DROP.
    pub fn handle_ipv6(&self, packet: &[u8]) -> Verdict {
        match udp_payload_ipv6(packet) {
            Some(datagram) => self.handle(&datagram),
            None => Verdict::Drop,
        }
    }

    /// Dispatch on the rule's address family.
    pub fn handle(&self, datagram: &Datagram<'_, impl std::fmt::Display>) -> Verdict {
        if self.debug {
            tracing::debug!(
                source = %datagram.source,
                source_port = datagram.source_port,
                destination_port = datagram.destination_port,
                len = datagram.payload.len(),
                "SysRq datagram"
            );
        }
        self.api.validate(datagram.payload)
    }

    /// Run a raw packet of the rule's address family.
    pub fn handle_packet(&self, packet: &[u8]) -> Verdict {
        match self.entry.family {
            AddressFamily::Ipv4 => self.handle_ipv4(packet),
            AddressFamily::Ipv6 => self.handle_ipv6(packet),
        }
    }
}

/// Build a minimal IPv4/UDP packet around `payload`.
#[cfg(test)]
pub(crate) fn ipv4_udp_packet(payload: &[u8]) -> Vec<u8> {
    let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
    let total = (IPV4_MIN_HEADER_LEN + usize::from(udp_len)) as u16;
    let mut packet = vec![0u8; IPV4_MIN_HEADER_LEN];
    packet[0] = 0x45;
    packet[2..4].copy_from_slice(&total.to_be_bytes());
    packet[8] = 64;
    packet[9] = IpProtocol::UDP.0;
    packet[12..16].copy_from_slice(&[192, 0, 2, 1]);
    packet[16..20].copy_from_slice(&[192, 0, 2, 2]);
    packet.extend_from_slice(&40000u16.to_be_bytes());
    packet.extend_from_slice(&9u16.to_be_bytes());
    packet.extend_from_slice(&udp_len.to_be_bytes());
    packet.extend_from_slice(&[0, 0]);
    packet.extend_from_slice(payload);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuthorizedRequest, SequenceNumber};
    use crate::adapters::sink::RecordingSink;
    use crate::domain::config::SysrqConfig;
    use crate::domain::errors::ValidationError;
    use crate::service::RemoteSysrqService;
    use parking_lot::Mutex;

    /// Accepts everything and remembers the payloads it saw.
    #[derive(Default)]
    struct CapturingApi {
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl RemoteSysrqApi for CapturingApi {
        fn authorize(&self, payload: &[u8]) -> Result<AuthorizedRequest, ValidationError> {
            self.seen.lock().push(payload.to_vec());
            Ok(AuthorizedRequest {
                sequence_number: 1,
                commands_dispatched: 0,
            })
        }

        fn last_sequence_number(&self) -> SequenceNumber {
            0
        }
    }

    /// IPv6 packet with the UDP length/coverage field set to `length_field`.
    fn ipv6_packet_with(next_header: u8, length_field: u16, payload: &[u8]) -> Vec<u8> {
        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
        let mut packet = vec![0u8; IPV6_HEADER_LEN];
        packet[0] = 0x60;
        packet[4..6].copy_from_slice(&udp_len.to_be_bytes());
        packet[6] = next_header;
        packet[7] = 64;
        packet[23] = 1;
        packet[39] = 2;
        packet.extend_from_slice(&40000u16.to_be_bytes());
        packet.extend_from_slice(&9u16.to_be_bytes());
        packet.extend_from_slice(&length_field.to_be_bytes());
        packet.extend_from_slice(&[0, 0]);
        packet.extend_from_slice(payload);
        packet
    }

    fn ipv6_udp_packet(next_header: u8, payload: &[u8]) -> Vec<u8> {
        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
        ipv6_packet_with(next_header, udp_len, payload)
    }

    /// IPv4 UDP-Lite packet with checksum coverage `coverage`.
    fn ipv4_udplite_packet(coverage: u16, payload: &[u8]) -> Vec<u8> {
        let mut packet = ipv4_udp_packet(payload);
        packet[9] = IpProtocol::UDPLITE.0;
        packet[24..26].copy_from_slice(&coverage.to_be_bytes());
        packet
    }

    fn reference_service() -> RemoteSysrqService<RecordingSink> {
        let config = SysrqConfig::default().with_password("secret").with_seqno(0);
        RemoteSysrqService::new(&config, RecordingSink::new()).unwrap()
    }

    const REFERENCE_PAYLOAD: &[u8] =
        b"s,1000000000,abcd,4e98113a8936c521682011fc4610d6bd086433c4";

    #[test]
    fn test_check_entry() {
        assert!(check_entry(&RuleEntry::udp(AddressFamily::Ipv4)).is_ok());
        let lite = RuleEntry {
            protocol: IpProtocol::UDPLITE,
            ..RuleEntry::udp(AddressFamily::Ipv6)
        };
        assert!(check_entry(&lite).is_ok());

        let tcp = RuleEntry {
            protocol: IpProtocol::TCP,
            ..RuleEntry::udp(AddressFamily::Ipv4)
        };
        assert!(matches!(
            check_entry(&tcp),
            Err(SetupError::UnsupportedTransport(_))
        ));

        let inverted = RuleEntry {
            protocol_inverted: true,
            ..RuleEntry::udp(AddressFamily::Ipv4)
        };
        assert!(matches!(
            check_entry(&inverted),
            Err(SetupError::UnsupportedTransport(_))
        ));
    }

    #[test]
    fn test_ipv4_payload_extracted() {
        let packet = ipv4_udp_packet(b"s,1,x,abc");
        let datagram = udp_payload_ipv4(&packet).unwrap();
        assert_eq!(datagram.payload, b"s,1,x,abc");
        assert_eq!(datagram.source, Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(datagram.destination_port, 9);
    }

    #[test]
    fn test_ipv4_udp_length_bounds_payload() {
        let mut packet = ipv4_udp_packet(b"abcdef");
        // Trailing bytes beyond the UDP length are not part of the payload.
        packet.extend_from_slice(b"padding");
        assert_eq!(udp_payload_ipv4(&packet).unwrap().payload, b"abcdef");

        // A length field larger than the packet is clamped to what is present.
        let mut packet = ipv4_udp_packet(b"abcdef");
        packet[24..26].copy_from_slice(&1000u16.to_be_bytes());
        assert_eq!(udp_payload_ipv4(&packet).unwrap().payload, b"abcdef");
    }

    #[test]
    fn test_ipv4_rejects_bad_headers() {
        assert!(udp_payload_ipv4(&[]).is_none());

        let mut packet = ipv4_udp_packet(b"abc");
        packet[9] = IpProtocol::TCP.0;
        assert!(udp_payload_ipv4(&packet).is_none());

        let mut packet = ipv4_udp_packet(b"abc");
        packet[0] = 0x44;
        assert!(udp_payload_ipv4(&packet).is_none());

        let mut packet = ipv4_udp_packet(b"abc");
        packet[24..26].copy_from_slice(&4u16.to_be_bytes());
        assert!(udp_payload_ipv4(&packet).is_none());

        let packet = ipv4_udp_packet(b"abc");
        assert!(udp_payload_ipv4(&packet[..25]).is_none());
    }

    #[test]
    fn test_ipv6_payload_extracted() {
        let packet = ipv6_udp_packet(IpProtocol::UDPLITE.0, b"b,2,y,def");
        let datagram = udp_payload_ipv6(&packet).unwrap();
        assert_eq!(datagram.payload, b"b,2,y,def");
        assert_eq!(datagram.source, "::1".parse::<Ipv6Addr>().unwrap());

        let packet = ipv6_udp_packet(IpProtocol::TCP.0, b"x");
        assert!(udp_payload_ipv6(&packet).is_none());
    }

    #[test]
    fn test_udplite_length_comes_from_ip_header() {
        // Coverage 0 means the whole datagram.
        let packet = ipv6_packet_with(IpProtocol::UDPLITE.0, 0, b"b,2,y,def");
        assert_eq!(udp_payload_ipv6(&packet).unwrap().payload, b"b,2,y,def");

        // Coverage 8 protects the header only; the payload is still whole.
        let packet = ipv6_packet_with(IpProtocol::UDPLITE.0, 8, b"b,2,y,def");
        assert_eq!(udp_payload_ipv6(&packet).unwrap().payload, b"b,2,y,def");

        let packet = ipv4_udplite_packet(0, b"abcdef");
        assert_eq!(udp_payload_ipv4(&packet).unwrap().payload, b"abcdef");

        // Link-layer padding past the IPv4 total length is ignored.
        let mut packet = ipv4_udplite_packet(8, b"abcdef");
        packet.extend_from_slice(b"padding");
        assert_eq!(udp_payload_ipv4(&packet).unwrap().payload, b"abcdef");
    }

    #[test]
    fn test_udplite_ip_length_below_header_rejected() {
        let mut packet = ipv4_udplite_packet(0, b"abc");
        packet[2..4].copy_from_slice(&24u16.to_be_bytes());
        assert!(udp_payload_ipv4(&packet).is_none());

        let mut packet = ipv6_packet_with(IpProtocol::UDPLITE.0, 0, b"abc");
        packet[4..6].copy_from_slice(&4u16.to_be_bytes());
        assert!(udp_payload_ipv6(&packet).is_none());
    }

    #[test]
    fn test_udplite_request_accepted_end_to_end() {
        for coverage in [0u16, 8] {
            let entry = RuleEntry {
                protocol: IpProtocol::UDPLITE,
                ..RuleEntry::udp(AddressFamily::Ipv6)
            };
            let target = SysrqTarget::install(entry, reference_service()).unwrap();
            let packet = ipv6_packet_with(IpProtocol::UDPLITE.0, coverage, REFERENCE_PAYLOAD);
            assert_eq!(target.handle_packet(&packet), Verdict::Accept, "coverage {coverage}");
            assert_eq!(target.api().sink().keys(), b"s".to_vec());

            let entry = RuleEntry {
                protocol: IpProtocol::UDPLITE,
                ..RuleEntry::udp(AddressFamily::Ipv4)
            };
            let target = SysrqTarget::install(entry, reference_service()).unwrap();
            let packet = ipv4_udplite_packet(coverage, REFERENCE_PAYLOAD);
            assert_eq!(target.handle_packet(&packet), Verdict::Accept, "coverage {coverage}");
            assert_eq!(target.api().sink().keys(), b"s".to_vec());
        }
    }

    #[test]
    fn test_ipv6_extension_header_dropped() {
        // Hop-by-hop options (next header 0) in front of the UDP header.
        let target = SysrqTarget::install(
            RuleEntry::udp(AddressFamily::Ipv6),
            reference_service(),
        )
        .unwrap();
        let packet = ipv6_udp_packet(0, REFERENCE_PAYLOAD);
        assert_eq!(target.handle_packet(&packet), Verdict::Drop);
        assert!(target.api().sink().keys().is_empty());
        assert_eq!(target.api().last_sequence_number(), 0);
    }

    #[test]
    fn test_target_routes_payload() {
        let target = SysrqTarget::install(
            RuleEntry::udp(AddressFamily::Ipv4),
            CapturingApi::default(),
        )
        .unwrap()
        .with_debug(true);

        assert_eq!(target.handle_packet(&ipv4_udp_packet(b"hello")), Verdict::Accept);
        assert_eq!(target.handle_packet(b"garbage"), Verdict::Drop);
        assert_eq!(target.api().seen.lock().clone(), vec![b"hello".to_vec()]);
    }

    #[test]
    fn test_install_rejects_tcp() {
        let entry = RuleEntry {
            protocol: IpProtocol::TCP,
            ..RuleEntry::udp(AddressFamily::Ipv4)
        };
        assert!(SysrqTarget::install(entry, CapturingApi::default()).is_err());
    }
}
