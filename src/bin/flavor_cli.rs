use std::{
    error::Error,
    io::{self, Write},
};

use clap::Parser;
use protoflavor::{FlavorKind, Subsystem, bootstrap, selector};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Protocols flavor to describe
    #[arg(long, env = "PROTOCOLS_FLAVOR", value_enum, default_value_t)]
    flavor: FlavorKind,
    /// Also check every answer against the builtin transports
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();
    let flavor = selector::initialize(cli.flavor.build())?;
    let mut stdout = io::stdout().lock();

    writeln!(&mut stdout, "flavor: {}", flavor.name())?;
    for subsystem in Subsystem::ALL {
        writeln!(&mut stdout, "{subsystem:<22}{}", flavor.protocol(subsystem))?;
    }
    writeln!(&mut stdout, "client error: {}", flavor.client_error_type())?;
    writeln!(&mut stdout, "timeout message: {}", flavor.timeout_message())?;

    writeln!(&mut stdout, "service map:")?;
    for binding in flavor.service_bindings() {
        writeln!(&mut stdout, "  {binding}")?;
    }

    if cli.verify {
        bootstrap::verify(flavor, selector::registry())?;
        writeln!(&mut stdout, "all protocols resolved")?;
    }

    Ok(())
}
