mod cli;
mod commands;
mod config;
mod game;
mod store;
mod target;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::catalog::CatalogArgs;
use commands::read::ReadMode;
use commands::write::WriteMode;
use config::CliConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "xivmem=debug" } else { "xivmem=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;

    // Export works offline; everything else attaches to the game first
    let attach = || target::attach(cli.pid, cli.process.as_deref(), &config);

    match cli.command {
        Command::Modules => commands::modules::run(&attach()?),
        Command::Resolve { descriptor } => commands::resolve::run(&attach()?, &descriptor),
        Command::Read {
            descriptor,
            kind,
            bytes,
            string,
            offset,
        } => commands::read::run(
            &attach()?,
            &descriptor,
            ReadMode::from_args(kind, bytes, string),
            offset.as_deref(),
        ),
        Command::Write {
            descriptor,
            kind,
            string,
            no_terminator,
            offset,
            value,
        } => {
            let mode = match (string, kind) {
                (Some(encoding), _) => WriteMode::String {
                    encoding,
                    zero_terminate: !no_terminator,
                },
                (None, Some(kind)) => WriteMode::Scalar(kind),
                (None, None) => anyhow::bail!("Specify --as <kind> or --string <encoding>"),
            };
            commands::write::run(&attach()?, &descriptor, mode, offset.as_deref(), &value)
        }
        Command::Catalog {
            version,
            store,
            refresh,
        } => commands::catalog::run(
            &attach()?,
            &config,
            CatalogArgs {
                version: version.as_deref(),
                store: store.as_deref(),
                refresh,
            },
        ),
        Command::Export {
            version,
            fields,
            pointers,
        } => commands::export::run(&version, &fields, &pointers),
    }
}
