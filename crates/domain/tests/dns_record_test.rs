use stubdns_domain::{AddressFamily, RecordClass, RecordType, ResponseCode};
use std::net::IpAddr;
use std::str::FromStr;

#[test]
fn test_record_type_codes_match_registry() {
    assert_eq!(RecordType::A.to_u16(), 1);
    assert_eq!(RecordType::NS.to_u16(), 2);
    assert_eq!(RecordType::CNAME.to_u16(), 5);
    assert_eq!(RecordType::MX.to_u16(), 15);
    assert_eq!(RecordType::TXT.to_u16(), 16);
    assert_eq!(RecordType::AAAA.to_u16(), 28);
}

#[test]
fn test_record_type_from_u16_roundtrips_known_codes() {
    for code in (1..=16).chain([28]) {
        let rt = RecordType::from_u16(code);
        assert!(rt.mnemonic().is_some(), "code {} should be known", code);
        assert_eq!(rt.to_u16(), code);
    }
}

#[test]
fn test_unknown_record_type_is_preserved() {
    let rt = RecordType::from_u16(65);
    assert_eq!(rt, RecordType::Unknown(65));
    assert_eq!(rt.to_u16(), 65);
    assert_eq!(rt.to_string(), "TYPE65");
    assert_eq!(RecordType::from_str("TYPE65").unwrap(), rt);
}

#[test]
fn test_unknown_with_registered_code_is_the_named_type() {
    let hand_built = RecordType::Unknown(1);
    assert_eq!(hand_built, RecordType::A);
    assert_eq!(RecordType::from_u16(hand_built.to_u16()), hand_built);
    assert_eq!(hand_built.normalized(), RecordType::A);
    assert!(matches!(hand_built.normalized(), RecordType::A));
    assert!(hand_built.is_address());
    assert_eq!(hand_built.to_string(), "A");
    assert_eq!(
        AddressFamily::from_record_type(RecordType::Unknown(28)),
        Some(AddressFamily::Ipv6)
    );

    let mut set = std::collections::HashSet::new();
    set.insert(RecordType::A);
    assert!(set.contains(&RecordType::Unknown(1)));
}

#[test]
fn test_record_type_parse_is_case_insensitive() {
    assert_eq!(RecordType::from_str("aaaa").unwrap(), RecordType::AAAA);
    assert_eq!(RecordType::from_str("Cname").unwrap(), RecordType::CNAME);
    assert!(RecordType::from_str("BOGUS").is_err());
}

#[test]
fn test_record_class_codes() {
    assert_eq!(RecordClass::IN.to_u16(), 1);
    assert_eq!(RecordClass::from_u16(3), RecordClass::CH);
    assert_eq!(RecordClass::from_u16(255), RecordClass::Unknown(255));
    assert_eq!(RecordClass::default(), RecordClass::IN);
    assert!(RecordClass::from_str("XX").is_err());
}

#[test]
fn test_response_code_descriptions() {
    assert_eq!(ResponseCode::from_u8(0), ResponseCode::NoError);
    assert_eq!(ResponseCode::from_u8(3), ResponseCode::NXDomain);
    assert_eq!(ResponseCode::NXDomain.description(), "Name error");
    assert_eq!(ResponseCode::ServFail.description(), "Server failure");
    assert_eq!(ResponseCode::from_u8(9), ResponseCode::Unknown(9));
    assert_eq!(ResponseCode::Unknown(9).to_u8(), 9);
    assert!(ResponseCode::NoError.is_success());
    assert!(!ResponseCode::Refused.is_success());
}

#[test]
fn test_address_family_record_types() {
    assert_eq!(AddressFamily::Ipv4.record_type(), RecordType::A);
    assert_eq!(AddressFamily::Ipv6.record_type(), RecordType::AAAA);
    assert_eq!(
        AddressFamily::from_record_type(RecordType::AAAA),
        Some(AddressFamily::Ipv6)
    );
    assert_eq!(AddressFamily::from_record_type(RecordType::MX), None);
}

#[test]
fn test_address_family_of_ip() {
    let v4: IpAddr = "192.0.2.1".parse().unwrap();
    let v6: IpAddr = "2001:db8::1".parse().unwrap();
    assert_eq!(AddressFamily::of(&v4), AddressFamily::Ipv4);
    assert_eq!(AddressFamily::of(&v6), AddressFamily::Ipv6);
    assert_eq!("6".parse::<AddressFamily>().unwrap(), AddressFamily::Ipv6);
}
