///
/// This module implements the CLI surface of regcard-uploader: argument parsing,
/// the async entrypoint and the user-visible run summary.
///
/// Core logic (input loading, the per-file state machine, payloads) lives in the
/// [`regcard-uploader-core`] crate. This module only wires configuration, the
/// HTTP client and the terminal prompt together.
///
/// ## How To Use
/// - Run `regcard-uploader` from the directory holding `reg_cards/`, `env/` and
///   the JSON inputs. No flags are required; every flag is an optional override.
/// - For programmatic/integration use: call [`run`] or [`run_with_prompt`].
///
/// [`regcard-uploader-core`]: ../../regcard-uploader-core/
use crate::load_config::{load_config, ConfigOverrides};
use crate::prompt::TerminalPrompt;
use crate::upload::DynamicFormsClient;
use anyhow::{Context, Result};
use clap::Parser;
use regcard_uploader_core::config::{Environment, RunConfig};
use regcard_uploader_core::contract::{DynamicFormsApi, SettingsPrompt};
use regcard_uploader_core::driver::{display_name, upload_all, FileState, UploadReport};
use regcard_uploader_core::inputs::{list_pdfs, load_field_mapping, load_property_map};
use std::path::PathBuf;

/// CLI for regcard-uploader: publish registration cards to the reporting API.
#[derive(Parser, Debug)]
#[clap(
    name = "regcard-uploader",
    version,
    about = "Upload registration card PDFs and their field mappings to the reporting API"
)]
pub struct Cli {
    /// Target environment (NA or EMEA); asked interactively when omitted
    #[clap(long)]
    pub environment: Option<Environment>,

    /// API base URL, e.g. https://host/v4-reports/ihg/properties (default: $API_BASE_URL)
    #[clap(long)]
    pub base_url: Option<String>,

    /// Directory holding env/, reg_cards/ and the JSON inputs
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Directory of registration card PDFs (default: <root>/reg_cards/<ENV>)
    #[clap(long)]
    pub reg_cards_dir: Option<PathBuf>,

    /// Property name → property id JSON file (default: <root>/property_id_map.json)
    #[clap(long)]
    pub property_map: Option<PathBuf>,

    /// Field mapping JSON file (default: <root>/field_mapping_stage.json)
    #[clap(long)]
    pub field_mapping: Option<PathBuf>,
}

impl From<&Cli> for ConfigOverrides {
    fn from(cli: &Cli) -> Self {
        ConfigOverrides {
            root: cli.root.clone(),
            environment: cli.environment,
            base_url: cli.base_url.clone(),
            reg_cards_dir: cli.reg_cards_dir.clone(),
            property_map: cli.property_map.clone(),
            field_mapping: cli.field_mapping.clone(),
        }
    }
}

/// Async CLI entrypoint for main(), prompting on the terminal.
pub async fn run(cli: Cli) -> Result<()> {
    run_with_prompt(cli, &TerminalPrompt).await
}

/// Same as [`run`] with an injected prompt, for integration tests.
pub async fn run_with_prompt<P>(cli: Cli, prompt: &P) -> Result<()>
where
    P: SettingsPrompt + ?Sized,
{
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(&ConfigOverrides::from(&cli), prompt)?;
    let client =
        DynamicFormsClient::from_config(&config).context("Failed to build HTTP client")?;

    let report = upload_registration_cards(&config, &client).await?;
    print_summary(&report);
    Ok(())
}

/// Load the inputs named by `config` and upload every matching registration card.
///
/// Fails only when an input is missing, malformed or empty; per-file API errors
/// are reported in the returned [`UploadReport`].
pub async fn upload_registration_cards<A>(config: &RunConfig, api: &A) -> Result<UploadReport>
where
    A: DynamicFormsApi + ?Sized,
{
    let paths = &config.paths;
    let property_map = load_property_map(&paths.property_map)?;
    let mappings = load_field_mapping(&paths.field_mapping)?;
    let files = list_pdfs(&paths.reg_cards_dir)?;

    tracing::info!(
        command = "upload",
        environment = %config.environment,
        files = files.len(),
        "Starting registration card upload"
    );
    Ok(upload_all(api, &files, &property_map, &mappings).await)
}

fn print_summary(report: &UploadReport) {
    println!(
        "Upload complete: {} mapped, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped.len()
    );
    for record in &report.records {
        match &record.state {
            FileState::Mapped { file_name } => println!(
                "  [OK]      {} ({}) -> {}",
                record.property_name, record.property_id, file_name
            ),
            FileState::Failed { step, reason } => println!(
                "  [FAILED]  {} ({}) at {}: {}",
                record.property_name, record.property_id, step, reason
            ),
            other => println!(
                "  [?]       {} ({}) stopped in {:?}",
                record.property_name, record.property_id, other
            ),
        }
    }
    for skipped in &report.skipped {
        println!(
            "  [SKIPPED] {}: no property_id found",
            display_name(&skipped.path)
        );
    }
}
