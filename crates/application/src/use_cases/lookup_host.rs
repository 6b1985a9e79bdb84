use crate::ports::{HostResolver, Resolution};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use stubdns_domain::{AddressFamily, DomainError};
use tracing::debug;

/// Which address families a host lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFamily {
    Only(AddressFamily),
    #[default]
    Any,
}

impl fmt::Display for LookupFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFamily::Only(family) => write!(f, "{}", family),
            LookupFamily::Any => f.write_str("any"),
        }
    }
}

impl FromStr for LookupFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("any") {
            return Ok(LookupFamily::Any);
        }
        s.parse::<AddressFamily>().map(LookupFamily::Only)
    }
}

pub struct LookupHostUseCase {
    resolver: Arc<dyn HostResolver>,
}

impl LookupHostUseCase {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves `name` for the requested families.
    ///
    /// `Any` runs the IPv4 and IPv6 lookups concurrently. The merged result
    /// succeeds when either family does; when both fail the IPv4 error wins.
    pub async fn execute(&self, name: &str, family: LookupFamily) -> Result<Resolution, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidDomainName(
                "empty host name".to_string(),
            ));
        }

        match family {
            LookupFamily::Only(family) => self.resolver.resolve(name, family).await,
            LookupFamily::Any => {
                let (v4, v6) = tokio::join!(
                    self.resolver.resolve(name, AddressFamily::Ipv4),
                    self.resolver.resolve(name, AddressFamily::Ipv6)
                );
                Self::merge(name, v4, v6)
            }
        }
    }

    fn merge(
        name: &str,
        v4: Result<Resolution, DomainError>,
        v6: Result<Resolution, DomainError>,
    ) -> Result<Resolution, DomainError> {
        match (v4, v6) {
            (Ok(mut v4), Ok(v6)) => {
                for addr in v6.addresses {
                    if !v4.addresses.contains(&addr) {
                        v4.addresses.push(addr);
                    }
                }
                v4.cache_hit = v4.cache_hit && v6.cache_hit;
                v4.server = v4.server.or(v6.server);
                Ok(v4)
            }
            (Ok(v4), Err(e)) => {
                debug!(name = %name, error = %e, "IPv6 lookup failed, returning IPv4 answer");
                Ok(v4)
            }
            (Err(e), Ok(v6)) => {
                debug!(name = %name, error = %e, "IPv4 lookup failed, returning IPv6 answer");
                Ok(v6)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }
}
