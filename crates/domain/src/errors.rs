use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("DNS transaction mismatch: expected id {expected:#06x}, got {actual:#06x}")]
    TransactionMismatch { expected: u16, actual: u16 },

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Unknown host: {0}")]
    UnknownHost(String),

    #[error("DNS server error {code}: {description}")]
    ServerError { code: u8, description: &'static str },

    #[error("Query timeout resolving {name}: no server answered")]
    Timeout { name: String },

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("No DNS servers available")]
    NoServers,

    #[error("Resolution cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DomainError::MalformedMessage(reason.into())
    }

    /// True for both framing errors and transaction-id mismatches.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedMessage(_) | DomainError::TransactionMismatch { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::Timeout { .. })
    }
}
