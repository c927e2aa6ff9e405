//! DNS-over-UDP wire codec (RFC 1035 §4.1).
//!
//! Plain A/AAAA questions in the IN class are decoded and answered straight
//! from the bytes. Everything else (compressed names, other types and
//! classes, binary labels) goes through `hickory_proto::op::Message`.
//! Allowed queries never pass through the encoder: they are forwarded and
//! relayed as raw bytes.

use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{DNSClass, RData, Record, RecordType as HickoryRecordType};
use sinkhole_dns_domain::{DnsQuery, DomainError, RecordType, SinkholeConfig};
use std::sync::Arc;

pub const DNS_HEADER_LEN: usize = 12;

/// Largest datagram read from clients (unextended DNS over UDP).
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

pub const SINKHOLE_TTL: u32 = 60;

const MAX_NAME_WIRE_LEN: usize = 255;

const FLAG_QR: u16 = 0x8000;
const FLAG_AA: u16 = 0x0400;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;
/// QR plus the four OPCODE bits.
const FLAG_QR_OPCODE: u16 = 0xF800;

const CLASS_IN: u16 = 1;
const POINTER_TO_QUESTION: [u8; 2] = [0xC0, DNS_HEADER_LEN as u8];

fn malformed(reason: impl Into<String>) -> DomainError {
    DomainError::MalformedMessage(reason.into())
}

/// Decodes a raw datagram into its first question.
///
/// Fails with `MalformedMessage` when the payload is not a well-formed DNS
/// message, is a response rather than a query, or carries no question.
/// Labels may hold arbitrary octets; those are rendered in escaped
/// presentation form (`\.` for a literal dot, `\377` for non-ASCII).
pub fn parse_query(buf: &[u8]) -> Result<DnsQuery, DomainError> {
    if let Some(query) = parse_plain_query(buf) {
        return Ok(query);
    }

    let message = Message::from_vec(buf).map_err(|e| malformed(e.to_string()))?;
    if message.message_type() != MessageType::Query {
        return Err(malformed("message is a response, not a query"));
    }
    let question = message
        .queries()
        .first()
        .ok_or_else(|| malformed("message has no question"))?;

    let name = question.name().to_ascii();
    let domain = name.strip_suffix('.').unwrap_or(&name);

    Ok(DnsQuery {
        id: message.id(),
        domain: Arc::from(domain),
        record_type: RecordType::from_u16(u16::from(question.query_type())),
        qclass: u16::from(question.query_class()),
        recursion_desired: message.recursion_desired(),
    })
}

/// Byte-level decode of a standard query carrying exactly one A or AAAA
/// question in the IN class, with uncompressed labels made of letters,
/// digits, `-` and `_`. Returns `None` for anything else.
fn parse_plain_query(buf: &[u8]) -> Option<DnsQuery> {
    if buf.len() < DNS_HEADER_LEN + 5 {
        return None;
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let flags = u16::from_be_bytes([buf[2], buf[3]]);
    let qdcount = u16::from_be_bytes([buf[4], buf[5]]);
    let ancount = u16::from_be_bytes([buf[6], buf[7]]);
    let nscount = u16::from_be_bytes([buf[8], buf[9]]);

    if flags & FLAG_QR_OPCODE != 0 || qdcount != 1 || ancount != 0 || nscount != 0 {
        return None;
    }

    let mut domain = String::new();
    let mut pos = DNS_HEADER_LEN;
    loop {
        let len = *buf.get(pos)? as usize;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 != 0 {
            return None;
        }
        let label = buf.get(pos + 1..pos + 1 + len)?;
        if !is_plain_label(label) {
            return None;
        }
        if !domain.is_empty() {
            domain.push('.');
        }
        domain.extend(label.iter().map(|&b| b as char));
        pos += 1 + len;
        if pos - DNS_HEADER_LEN + 1 > MAX_NAME_WIRE_LEN {
            return None;
        }
    }

    let qtype = u16::from_be_bytes([*buf.get(pos)?, *buf.get(pos + 1)?]);
    let qclass = u16::from_be_bytes([*buf.get(pos + 2)?, *buf.get(pos + 3)?]);
    let record_type = RecordType::from_u16(qtype);
    if qclass != CLASS_IN || !record_type.is_address() {
        return None;
    }

    Some(DnsQuery {
        id,
        domain: Arc::from(domain),
        record_type,
        qclass,
        recursion_desired: flags & FLAG_RD != 0,
    })
}

/// Labels whose presentation form needs no escaping.
fn is_plain_label(label: &[u8]) -> bool {
    match label.split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphanumeric() || *first == b'_')
                && rest
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        }
        None => false,
    }
}

fn is_plain_name(domain: &str) -> bool {
    domain.is_empty() || domain.split('.').all(|label| is_plain_label(label.as_bytes()))
}

/// Builds the reply for a blocked query.
///
/// Flags are QR, AA and RA, with RD copied from the query. A and AAAA
/// questions in the IN class get one answer pointing at the configured
/// sinkhole address with a 60 second TTL; every other question gets a
/// NOERROR reply with an empty answer section. `raw` is the original
/// datagram, decoded again when the question is not plain.
pub fn encode_sinkhole_response(
    raw: &[u8],
    query: &DnsQuery,
    sinkhole: &SinkholeConfig,
) -> Result<Vec<u8>, DomainError> {
    if query.qclass == CLASS_IN && query.record_type.is_address() && is_plain_name(&query.domain)
    {
        return Ok(encode_plain_address_response(query, sinkhole));
    }
    encode_with_hickory(raw, sinkhole)
}

fn encode_plain_address_response(query: &DnsQuery, sinkhole: &SinkholeConfig) -> Vec<u8> {
    let rdata = match query.record_type {
        RecordType::AAAA => sinkhole.ipv6.octets().to_vec(),
        _ => sinkhole.ipv4.octets().to_vec(),
    };

    let mut flags = FLAG_QR | FLAG_AA | FLAG_RA;
    if query.recursion_desired {
        flags |= FLAG_RD;
    }

    let mut buf = Vec::with_capacity(MAX_UDP_MESSAGE_SIZE);
    buf.extend_from_slice(&query.id.to_be_bytes());
    buf.extend_from_slice(&flags.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());

    write_name(&mut buf, &query.domain);
    buf.extend_from_slice(&query.record_type.to_u16().to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());

    buf.extend_from_slice(&POINTER_TO_QUESTION);
    buf.extend_from_slice(&query.record_type.to_u16().to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());
    buf.extend_from_slice(&SINKHOLE_TTL.to_be_bytes());
    buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    buf.extend_from_slice(&rdata);

    buf
}

fn encode_with_hickory(raw: &[u8], sinkhole: &SinkholeConfig) -> Result<Vec<u8>, DomainError> {
    let request = Message::from_vec(raw).map_err(|e| malformed(e.to_string()))?;
    let question = request
        .queries()
        .first()
        .cloned()
        .ok_or_else(|| malformed("message has no question"))?;

    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_authoritative(true)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);

    if let Some(rdata) = sinkhole_rdata(&question, sinkhole) {
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            SINKHOLE_TTL,
            rdata,
        ));
    }
    response.add_query(question);

    response.to_vec().map_err(|e| malformed(e.to_string()))
}

fn sinkhole_rdata(question: &Query, sinkhole: &SinkholeConfig) -> Option<RData> {
    if question.query_class() != DNSClass::IN {
        return None;
    }
    match question.query_type() {
        HickoryRecordType::A => Some(RData::A(A(sinkhole.ipv4))),
        HickoryRecordType::AAAA => Some(RData::AAAA(AAAA(sinkhole.ipv6))),
        _ => None,
    }
}

/// Writes a dotted name as uncompressed labels. Only called for names that
/// passed [`is_plain_name`].
fn write_name(buf: &mut Vec<u8>, domain: &str) {
    if !domain.is_empty() {
        for label in domain.split('.') {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0);
}
