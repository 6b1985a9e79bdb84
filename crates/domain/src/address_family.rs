use crate::dns_record::RecordType;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address family a lookup targets; each maps onto one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub const ALL: [AddressFamily; 2] = [AddressFamily::Ipv4, AddressFamily::Ipv6];

    pub fn record_type(&self) -> RecordType {
        match self {
            AddressFamily::Ipv4 => RecordType::A,
            AddressFamily::Ipv6 => RecordType::AAAA,
        }
    }

    pub fn from_record_type(record_type: RecordType) -> Option<Self> {
        match record_type.normalized() {
            RecordType::A => Some(AddressFamily::Ipv4),
            RecordType::AAAA => Some(AddressFamily::Ipv6),
            _ => None,
        }
    }

    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("ipv4"),
            AddressFamily::Ipv6 => f.write_str("ipv6"),
        }
    }
}

impl FromStr for AddressFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "4" | "ipv4" | "inet" | "a" => Ok(AddressFamily::Ipv4),
            "6" | "ipv6" | "inet6" | "aaaa" => Ok(AddressFamily::Ipv6),
            _ => Err(format!("Unknown address family: {}", s)),
        }
    }
}
