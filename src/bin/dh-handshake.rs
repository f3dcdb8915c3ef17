//! Command line front end: run a listener or a single connector.

use std::process::ExitCode;

use clap::Parser;
use dh_handshake::{
    DEFAULT_PORT, DEFAULT_PRIME_BITS, DhProtocolBuilder, IpVersion, Result,
    core::constants::DEFAULT_FERMAT_ROUNDS,
    sync::bind_listener,
};

/// Diffie-Hellman key agreement over TCP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Listen for connectors instead of connecting
    #[arg(short, long)]
    listen: bool,

    /// Use IPv6
    #[arg(short = '6')]
    ipv6: bool,

    /// Port to listen on or connect to
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host to connect to
    #[arg(short, long, required_unless_present = "listen", conflicts_with = "listen")]
    destination: Option<String>,

    /// Bit width of the generated prime
    #[arg(long, default_value_t = DEFAULT_PRIME_BITS)]
    bits: u64,

    /// Fermat rounds per primality check
    #[arg(long, default_value_t = DEFAULT_FERMAT_ROUNDS)]
    rounds: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn ip_version(&self) -> IpVersion {
        if self.ipv6 { IpVersion::V6 } else { IpVersion::V4 }
    }

    fn builder(&self) -> DhProtocolBuilder {
        let builder = DhProtocolBuilder::new()
            .with_prime_bits(self.bits)
            .with_fermat_rounds(self.rounds);
        match self.seed {
            Some(seed) => builder.with_seed(seed),
            None => builder,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if args.listen {
        let mut session = args.builder().as_listener().build_listener()?;
        let mut acceptor = bind_listener(args.ip_version(), args.port)?;
        session.serve(&mut acceptor)
    }

    let destination = args.destination.as_deref().unwrap_or("localhost");
    let mut session = args.builder().as_connector().build_connector()?;
    session.connect(destination, args.port, args.ip_version())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
