use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Resource record type codes (RFC 1035 §3.2.2, RFC 3596).
///
/// Codes without a dedicated variant round-trip through `Unknown` so that
/// decoding never fails on an unfamiliar type. Equality and hashing go by
/// numeric code, so `Unknown(1)` is the same type as `A`.
#[derive(Debug, Clone, Copy, Eq)]
pub enum RecordType {
    A,
    NS,
    MD,
    MF,
    CNAME,
    SOA,
    MB,
    MG,
    MR,
    NULL,
    WKS,
    PTR,
    HINFO,
    MINFO,
    MX,
    TXT,
    AAAA,
    Unknown(u16),
}

impl RecordType {
    /// Maps an `Unknown` carrying a registered code onto its named variant.
    pub fn normalized(self) -> Self {
        Self::from_u16(self.to_u16())
    }

    pub fn mnemonic(&self) -> Option<&'static str> {
        Some(match self.normalized() {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::MD => "MD",
            RecordType::MF => "MF",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::MB => "MB",
            RecordType::MG => "MG",
            RecordType::MR => "MR",
            RecordType::NULL => "NULL",
            RecordType::WKS => "WKS",
            RecordType::PTR => "PTR",
            RecordType::HINFO => "HINFO",
            RecordType::MINFO => "MINFO",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::AAAA => "AAAA",
            RecordType::Unknown(_) => return None,
        })
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::MD => 3,
            RecordType::MF => 4,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::MB => 7,
            RecordType::MG => 8,
            RecordType::MR => 9,
            RecordType::NULL => 10,
            RecordType::WKS => 11,
            RecordType::PTR => 12,
            RecordType::HINFO => 13,
            RecordType::MINFO => 14,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::Unknown(code) => *code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::NS,
            3 => RecordType::MD,
            4 => RecordType::MF,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            7 => RecordType::MB,
            8 => RecordType::MG,
            9 => RecordType::MR,
            10 => RecordType::NULL,
            11 => RecordType::WKS,
            12 => RecordType::PTR,
            13 => RecordType::HINFO,
            14 => RecordType::MINFO,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            other => RecordType::Unknown(other),
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self.normalized(), RecordType::A | RecordType::AAAA)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.to_u16() == other.to_u16()
    }
}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_u16().hash(state);
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(name) => f.write_str(name),
            None => write!(f, "TYPE{}", self.to_u16()),
        }
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        let parsed = match upper.as_str() {
            "A" => RecordType::A,
            "NS" => RecordType::NS,
            "MD" => RecordType::MD,
            "MF" => RecordType::MF,
            "CNAME" => RecordType::CNAME,
            "SOA" => RecordType::SOA,
            "MB" => RecordType::MB,
            "MG" => RecordType::MG,
            "MR" => RecordType::MR,
            "NULL" => RecordType::NULL,
            "WKS" => RecordType::WKS,
            "PTR" => RecordType::PTR,
            "HINFO" => RecordType::HINFO,
            "MINFO" => RecordType::MINFO,
            "MX" => RecordType::MX,
            "TXT" => RecordType::TXT,
            "AAAA" => RecordType::AAAA,
            _ => {
                return upper
                    .strip_prefix("TYPE")
                    .and_then(|code| code.parse::<u16>().ok())
                    .map(RecordType::from_u16)
                    .ok_or_else(|| format!("Unknown record type: {}", s))
            }
        };
        Ok(parsed)
    }
}
