use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

fn about_message() -> String {
    format!(
        "Replica catalog management for step-by-step workflow runs\nVersion: {}",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Parser, Clone)]
#[clap(
    name = "replica-catalog",
    about = about_message(),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Master catalog file, overriding the configuration
    #[clap(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct WorkdirArgs {
    /// Working directory of the step
    #[clap(long, value_name = "DIR")]
    pub workdir: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve a reference (`LFN:/...` or a plain path) against the master catalog
    Resolve {
        reference: String,

        /// Output the resolution in JSON format
        #[clap(long)]
        json: bool,
    },

    /// Write the step catalog for a step's inputs into its working directory
    Prepare {
        #[clap(flatten)]
        workdir: WorkdirArgs,

        /// JSON file holding the step's input object
        #[clap(long, value_name = "FILE")]
        inputs: PathBuf,

        /// Step name used in messages
        #[clap(long, default_value = "step")]
        step: String,
    },

    /// Merge the catalog a step left in its working directory into the master catalog
    Merge {
        #[clap(flatten)]
        workdir: WorkdirArgs,
    },

    /// Convert the master catalog to a pool XML catalog
    ToPoolXml {
        /// Output file; standard output when omitted
        #[clap(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Merge a pool XML catalog into the master catalog
    FromPoolXml {
        /// Pool XML catalog to read
        xml: PathBuf,

        /// Directory relative replica paths are resolved against (default: the XML file's directory)
        #[clap(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },

    /// Register the outputs found in a step's working directory into its step catalog
    RegisterOutputs {
        #[clap(flatten)]
        workdir: WorkdirArgs,

        /// File name prefix of the outputs, overriding the configuration
        #[clap(long)]
        prefix: Option<String>,

        /// Output file types (extensions), overriding the configuration
        #[clap(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// LFN directory the outputs are registered under, overriding the configuration
        #[clap(long)]
        lfn_base: Option<String>,
    },

    /// Show the configuration and a summary of the master catalog
    Info {
        /// Output information in JSON format
        #[clap(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_register_outputs_arguments() {
        let cli = Cli::try_parse_from([
            "replica-catalog",
            "--catalog",
            "/runs/42/master.json",
            "register-outputs",
            "--workdir",
            "/work/step1",
            "--type",
            "sim",
            "--type",
            "dst",
        ])
        .unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("/runs/42/master.json")));
        match cli.command {
            Command::RegisterOutputs { workdir, types, prefix, .. } => {
                assert_eq!(workdir.workdir, PathBuf::from("/work/step1"));
                assert_eq!(types, vec!["sim", "dst"]);
                assert_eq!(prefix, None);
            }
            _ => panic!("unexpected command"),
        }
    }
}
