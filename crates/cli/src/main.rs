use clap::Parser;
use futures::future::join_all;
use std::process::ExitCode;
use stubdns_application::use_cases::LookupFamily;
use stubdns_domain::{AddressFamily, CliOverrides};
use tracing::{debug, info};

mod bootstrap;
mod di;

#[derive(Parser, Debug)]
#[command(name = "stubdns")]
#[command(version)]
#[command(about = "stubdns - asynchronous DNS stub resolver")]
struct Cli {
    /// Only look up IPv4 addresses
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// Only look up IPv6 addresses
    #[arg(short = '6')]
    ipv6: bool,

    /// DNS server to query (IP, IP:port or [IPv6]:port); repeatable
    #[arg(short = 's', long = "server", value_name = "ADDR")]
    servers: Vec<String>,

    /// Retransmission timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Transmissions per server before failing over
    #[arg(long)]
    attempts: Option<u8>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Host names to resolve
    #[arg(required = true, value_name = "NAME")]
    names: Vec<String>,
}

impl Cli {
    fn family(&self) -> LookupFamily {
        if self.ipv4 {
            LookupFamily::Only(AddressFamily::Ipv4)
        } else if self.ipv6 {
            LookupFamily::Only(AddressFamily::Ipv6)
        } else {
            LookupFamily::Any
        }
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            servers: self.servers.clone(),
            timeout_ms: self.timeout_ms,
            attempts_per_server: self.attempts,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!("Starting stubdns v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config).await?;
    let family = cli.family();
    debug!(family = %family, names = cli.names.len(), "Resolving");

    let lookups = cli
        .names
        .iter()
        .map(|name| services.lookup_host.execute(name, family));
    let results = join_all(lookups).await;

    let mut failed = false;
    for (name, result) in cli.names.iter().zip(results) {
        match result {
            Ok(resolution) if resolution.is_empty() => {
                println!("{}: no addresses", name);
            }
            Ok(resolution) => {
                let addresses: Vec<String> =
                    resolution.addresses.iter().map(|a| a.to_string()).collect();
                println!("{}: {}", name, addresses.join(" "));
            }
            Err(e) => {
                failed = true;
                eprintln!("{}: {}", name, e);
            }
        }
    }

    services.shutdown();

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
