use super::commands::{Cli, Command};
use super::handlers;
use crate::config::ConfigLoader;
use crate::logging::setup_logging;
use anyhow::Result;
use clap::Parser;

/// Parses the command line and runs the requested command.
pub fn process_command() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_config(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.master_catalog = Some(catalog);
    }
    setup_logging(&config)?;

    match cli.command {
        Command::Resolve { reference, json } => handlers::resolve(&config, &reference, json),
        Command::Prepare {
            workdir,
            inputs,
            step,
        } => handlers::prepare(&config, &workdir.workdir, &inputs, &step),
        Command::Merge { workdir } => handlers::merge(&config, &workdir.workdir),
        Command::ToPoolXml { output } => handlers::to_pool_xml(&config, output.as_deref()),
        Command::FromPoolXml { xml, base_dir } => {
            handlers::from_pool_xml(&config, &xml, base_dir.as_deref())
        }
        Command::RegisterOutputs {
            workdir,
            prefix,
            types,
            lfn_base,
        } => {
            if prefix.is_some() {
                config.output_prefix = prefix;
            }
            if !types.is_empty() {
                config.output_types = types;
            }
            if let Some(lfn_base) = lfn_base {
                config.output_lfn_base = lfn_base;
            }
            handlers::register_outputs(&config, &workdir.workdir)
        }
        Command::Info { json } => handlers::info(&config, json),
    }
}
