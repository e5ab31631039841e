//! TCF CMP CLI
//!
//! Builds the consent choice screen data and applies saved choices locally.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tcf_cmp::{
    error::Result,
    models::{ChoicesBridgeDto, Config, TcModel},
    pipeline::{ConsentContext, ConsentGenerator, ConsentStrings},
    services::{DefaultFetcher, NoTcStringCodec},
    storage::LocalStorage,
};

/// cmp - IAB TCF v2 and Google Additional Consent choices
#[derive(Parser, Debug)]
#[command(name = "cmp", version, about = "TCF consent choice builder")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "cmp.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the choice bundle as UI JSON
    Choices {
        /// Pre-select legitimate interest as for a first consent request
        #[arg(long)]
        first_time: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply an edited choice bundle
    Apply {
        /// Path to the edited choices JSON
        #[arg(long)]
        choices: PathBuf,
    },

    /// Consent to everything
    AcceptAll,

    /// Validate the configuration file
    Validate,
}

/// Result of applying choices: the TC model and the AC string.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppliedConsent<'a> {
    tc_model: &'a TcModel,
    ac_string: String,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load both vendor lists and restore the stored AC opt-ins.
///
/// No TC string codec ships with the CLI, so the TC model always starts fresh.
async fn prepare(generator: &ConsentGenerator) -> Result<ConsentContext> {
    let fetcher = DefaultFetcher::new(&generator.config().http)?;
    let ctx = generator.prepare(&fetcher).await?;

    log::info!(
        "Vendor list v{}: {} purposes, {} vendors, {} Google providers",
        ctx.gvl().vendor_list_version,
        ctx.gvl().purposes.len(),
        ctx.gvl().vendors.len(),
        ctx.ac_model.google_vendor_options().len()
    );
    Ok(ctx)
}

fn print_applied(ctx: &ConsentContext, strings: ConsentStrings) -> Result<()> {
    let applied = AppliedConsent {
        tc_model: &ctx.tc_model,
        ac_string: strings.ac,
    };
    println!("{}", serde_json::to_string_pretty(&applied)?);
    Ok(())
}

fn write_output(output: Option<&Path>, json: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Choices saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(Config::load_or_default(&cli.config));
    let storage = Arc::new(LocalStorage::new(&config.storage.dir));
    let generator = ConsentGenerator::new(Arc::clone(&config), Arc::new(NoTcStringCodec), storage);

    match cli.command {
        Command::Choices { first_time, output } => {
            let mut ctx = prepare(&generator).await?;
            ctx.first_time = first_time;

            let dto = generator.build_choices(&ctx)?;
            write_output(output.as_deref(), &dto.to_ui_json()?)?;
        }

        Command::Apply { choices } => {
            let dto = ChoicesBridgeDto::from_ui_json(&std::fs::read_to_string(&choices)?)?;
            let mut ctx = prepare(&generator).await?;

            let strings = generator.submit(&mut ctx, &dto).await;
            print_applied(&ctx, strings)?;
        }

        Command::AcceptAll => {
            let mut ctx = prepare(&generator).await?;

            let strings = generator.accept_all(&mut ctx).await;
            print_applied(&ctx, strings)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}
