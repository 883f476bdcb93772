mod args;
mod commands;

use crate::args::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use std::io::{BufWriter, Write};
use tlib_logger::Logger;
use tlib_registry::ConfigRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::builder().name(env!("CARGO_PKG_NAME")).level(cli.log_level.into()).init()?;

    let registry = ConfigRegistry::global();
    commands::register_all(registry, &cli.dir)?;

    let mut out = BufWriter::new(std::io::stdout().lock());
    match cli.command {
        Commands::List {} => commands::list(registry, &mut out)?,
        Commands::Show { modules } => commands::show(registry, &modules, &mut out)?,
    }
    out.flush()?;

    Ok(())
}
