use std::{error::Error, process::ExitCode};

use clap::Parser;
use log::{error, info};
use protoflavor::{FlavorKind, ServiceBinding, bootstrap, selector};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Protocols flavor to run with
    #[arg(long, env = "PROTOCOLS_FLAVOR", value_enum, default_value_t)]
    flavor: FlavorKind,
    /// Extra service to start, e.g. `grpc-vtworker`
    #[arg(long = "service-map")]
    service_map: Vec<ServiceBinding>,
    /// Address services would listen on
    #[arg(long, default_value = "0.0.0.0:15991")]
    address: String,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("startup failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let flavor = selector::initialize(cli.flavor.build())?;
    let endpoints = bootstrap::services(
        flavor,
        selector::registry(),
        &cli.service_map,
        &cli.address,
    )?;

    for endpoint in &endpoints {
        info!(
            "{} ready over {} at {}",
            endpoint.role, endpoint.protocol, endpoint.address
        );
        println!("{}\t{}", endpoint.implementation, endpoint.address);
    }
    Ok(())
}
