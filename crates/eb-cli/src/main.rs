//! eb - install scientific software with easyblocks

use anyhow::Result;
use clap::Parser;
use eb_core::PipelineOptions;
use tracing_subscriber::EnvFilter;

use eb_cli::cmd;
use eb_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dry_run = cli.dry_run;

    match cli.command {
        Commands::Install {
            easyconfigs,
            skip_sanity_check,
            skip_module,
            keep_builddir,
        } => {
            let options = PipelineOptions {
                skip_sanity: skip_sanity_check,
                skip_module,
                keep_builddir,
            };
            let layout = cli.layout.resolve()?;
            cmd::install::install(&easyconfigs, options, &layout, dry_run, cli.verbose)
        }
        Commands::SanityCheck { easyconfig } => {
            cmd::sanity::sanity_check(&easyconfig, &cli.layout.resolve()?)
        }
        Commands::Module { easyconfig } => cmd::module::module(&easyconfig, &cli.layout.resolve()?),
        Commands::List => {
            cmd::list::list();
            Ok(())
        }
        Commands::Show { easyconfig } => cmd::show::show(&easyconfig, &cli.layout.resolve()?),
    }
}
