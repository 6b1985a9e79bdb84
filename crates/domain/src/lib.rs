//! stubdns domain layer
pub mod address_family;
pub mod config;
pub mod dns_record;
pub mod errors;

pub use address_family::AddressFamily;
pub use config::{CacheConfig, CliOverrides, Config, ConfigError, LoggingConfig, ResolverConfig};
pub use dns_record::{RecordClass, RecordType, ResponseCode};
pub use errors::DomainError;
