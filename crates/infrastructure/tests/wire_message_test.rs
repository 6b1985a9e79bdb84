use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr};
use stubdns_domain::{DomainError, RecordClass, RecordType, ResponseCode};
use stubdns_infrastructure::dns::wire::{
    decode_name, Message, Query, RecordData, ResourceRecord, HEADER_LEN,
};

// `dig www.google.com` request as captured on the wire.
const GOOGLE_QUERY: [u8; 32] = [
    0x7c, 0x8d, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77, 0x77, 0x77,
    0x06, 0x67, 0x6f, 0x6f, 0x67, 0x6c, 0x65, 0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00, 0x01, 0x00, 0x01,
];

// A-record reply whose answer name is a pointer back to the question.
const AKAMAI_RESPONSE: [u8; 57] = [
    0xbd, 0x87, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x05, 0x65, 0x35, 0x31,
    0x35, 0x33, 0x02, 0x65, 0x39, 0x0a, 0x61, 0x6b, 0x61, 0x6d, 0x61, 0x69, 0x65, 0x64, 0x67, 0x65,
    0x03, 0x6e, 0x65, 0x74, 0x00, 0x00, 0x01, 0x00, 0x01, 0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x00, 0x00, 0x13, 0x00, 0x04, 0x02, 0x10, 0x27, 0x7c,
];

fn labels(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.') {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

#[test]
fn test_decode_captured_query() {
    let message = Message::decode(&GOOGLE_QUERY, 0x7C8D).unwrap();

    assert_eq!(message.id, 0x7C8D);
    assert!(!message.is_response);
    assert_eq!(message.opcode, 0);
    assert!(!message.truncated);
    assert!(message.recursion_desired);
    assert_eq!(message.queries.len(), 1);
    assert!(message.answers.is_empty());
    assert!(message.authority.is_empty());
    assert!(message.additional.is_empty());

    let query = &message.queries[0];
    assert_eq!(query.name, "www.google.com");
    assert_eq!(query.qtype, RecordType::A);
    assert_eq!(query.qclass, RecordClass::IN);
}

#[test]
fn test_decode_captured_response_with_pointer() {
    let message = Message::decode(&AKAMAI_RESPONSE, 0xBD87).unwrap();

    assert!(message.is_response);
    assert!(!message.authoritative);
    assert!(message.recursion_desired);
    assert!(message.recursion_available);
    assert_eq!(message.response_code, ResponseCode::NoError);
    assert_eq!(message.queries[0].name, "e5153.e9.akamaiedge.net");

    assert_eq!(message.answers.len(), 1);
    let answer = &message.answers[0];
    assert_eq!(answer.name, "e5153.e9.akamaiedge.net");
    assert_eq!(answer.record_type(), RecordType::A);
    assert_eq!(answer.rclass, RecordClass::IN);
    assert_eq!(answer.ttl, 19);
    assert_eq!(answer.data, RecordData::A(Ipv4Addr::new(2, 16, 39, 124)));
}

#[test]
fn test_decode_with_wrong_id_is_transaction_mismatch() {
    let err = Message::decode(&GOOGLE_QUERY, 0x1234).unwrap_err();

    assert_eq!(
        err,
        DomainError::TransactionMismatch {
            expected: 0x1234,
            actual: 0x7C8D
        }
    );
    assert!(err.is_malformed());
    assert!(err.to_string().contains("transaction mismatch"));
}

#[test]
fn test_encode_two_question_query() {
    let mut message = Message::new(0xDEAD);
    message.recursion_desired = true;
    message.queries.push(Query::new("melchor9000.me", RecordType::A));
    message.queries.push(Query::new("melchor9000.me", RecordType::AAAA));

    assert_eq!(message.wire_len(), 52);
    let encoded = message.encode().unwrap();

    let mut expected = vec![0xDE, 0xAD, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    expected.extend(labels("melchor9000.me"));
    expected.extend([0x00, 0x01, 0x00, 0x01]);
    expected.extend(labels("melchor9000.me"));
    expected.extend([0x00, 0x1C, 0x00, 0x01]);
    assert_eq!(&encoded[..], &expected[..]);
}

#[test]
fn test_encode_answers_of_three_types() {
    let host = "mbp-de-melchor.local";
    let v6: Ipv6Addr = "fd6b:587e:77a::c85:7e1b:1a5e:7fd1".parse().unwrap();

    let mut message = Message::new(0xDEAD);
    message.recursion_desired = true;
    message.answers = vec![
        ResourceRecord::new(host, 123, RecordData::A(Ipv4Addr::new(192, 168, 1, 101))),
        ResourceRecord::new(host, 123, RecordData::Aaaa(v6)),
        ResourceRecord::new(
            host,
            123,
            RecordData::Mx {
                preference: 1,
                exchange: host.to_string(),
            },
        ),
    ];

    assert_eq!(
        message.wire_len(),
        12 + (12 + 20 + 4) + (12 + 20 + 16) + (12 + 20 + 24)
    );
    let encoded = message.encode().unwrap();
    assert_eq!(encoded.len(), message.wire_len());

    let mut expected = vec![0xDE, 0xAD, 0x01, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00];
    expected.extend(labels(host));
    expected.extend([0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x7B, 0x00, 0x04, 192, 168, 1, 101]);
    expected.extend(labels(host));
    expected.extend([0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00, 0x7B, 0x00, 0x10]);
    expected.extend(v6.octets());
    expected.extend(labels(host));
    expected.extend([0x00, 0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x7B, 0x00, 0x18, 0x00, 0x01]);
    expected.extend(labels(host));
    assert_eq!(&encoded[..], &expected[..]);
}

#[test]
fn test_encode_then_decode_preserves_header_and_queries() {
    let mut message = Message::new(0x0102);
    message.is_response = true;
    message.opcode = 4;
    message.authoritative = true;
    message.truncated = true;
    message.recursion_available = true;
    message.response_code = ResponseCode::Refused;
    message.queries = vec![
        Query::new("a.example", RecordType::MX),
        Query::new("b.example", RecordType::Unknown(65280)).with_class(RecordClass::CH),
    ];

    let encoded = message.encode().unwrap();
    assert_eq!(Message::decode(&encoded, 0x0102).unwrap(), message);
}

#[test]
fn test_unknown_record_type_survives_as_raw_bytes() {
    let mut message = Message::new(9);
    message.is_response = true;
    message.additional.push(ResourceRecord::new(
        "txt.example",
        60,
        RecordData::Unknown {
            rtype: RecordType::TXT,
            data: Bytes::from_static(b"\x02hi"),
        },
    ));

    let encoded = message.encode().unwrap();
    let decoded = Message::decode(&encoded, 9).unwrap();
    assert_eq!(decoded.additional, message.additional);
}

#[test]
fn test_compressed_name_equals_uncompressed() {
    let (from_pointer, consumed) = decode_name(&AKAMAI_RESPONSE, 41).unwrap();
    let (plain, _) = decode_name(&AKAMAI_RESPONSE, HEADER_LEN).unwrap();

    assert_eq!(from_pointer, plain);
    assert_eq!(consumed, 2);
}

#[test]
fn test_rdlength_past_end_is_malformed() {
    let mut buf = AKAMAI_RESPONSE.to_vec();
    // rdlength 4 -> 8 with only 4 bytes left.
    buf[52] = 0x08;

    let err = Message::decode(&buf, 0xBD87).unwrap_err();
    assert!(matches!(err, DomainError::MalformedMessage(_)));
}

#[test]
fn test_truncated_header_is_malformed() {
    let err = Message::decode(&GOOGLE_QUERY[..7], 0x7C8D).unwrap_err();
    assert!(matches!(err, DomainError::MalformedMessage(_)));
}

#[test]
fn test_counts_larger_than_sections_are_malformed() {
    let mut buf = GOOGLE_QUERY.to_vec();
    buf[5] = 2;
    assert!(Message::decode(&buf, 0x7C8D).unwrap_err().is_malformed());
}

#[test]
fn test_pointer_loop_is_malformed() {
    let mut buf = vec![0x00, 0x01, 0x81, 0x80, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    // Question name points at itself.
    buf.extend([0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);

    let err = Message::decode(&buf, 1).unwrap_err();
    assert!(matches!(err, DomainError::MalformedMessage(_)));
}

#[test]
fn test_bad_payload_inside_valid_framing_is_skipped() {
    let mut message = Message::new(5);
    message.is_response = true;
    message.answers.push(ResourceRecord::new(
        "ok.example",
        30,
        RecordData::A(Ipv4Addr::new(10, 0, 0, 1)),
    ));
    let mut buf = message.encode().unwrap().to_vec();

    // Append an AAAA record carrying only two bytes and bump ANCOUNT.
    buf.extend(labels("bad.example"));
    buf.extend([0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1E, 0x00, 0x02, 0xff, 0xff]);
    buf[7] = 2;

    let decoded = Message::decode(&buf, 5).unwrap();
    assert_eq!(decoded.answers.len(), 1);
    assert_eq!(decoded.answers[0].name, "ok.example");
}
