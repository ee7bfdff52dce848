/// `load_config` module: resolves the [`RunConfig`] for one upload run from CLI
/// overrides, the per-environment dotenv file and interactive prompts.
///
/// # Resolution order
/// 1. Environment: `--environment`, else asked through [`SettingsPrompt`]; with no
///    terminal available the default (`NA`) is used.
/// 2. `<root>/env/.env.<na|emea>` is loaded if present. Variables already set in
///    the process environment take precedence over the file.
/// 3. Base URL: `--base-url`, else `API_BASE_URL`.
/// 4. Bearer token: `BEARER_TOKEN`, else asked through [`SettingsPrompt`].
/// 5. Input paths: defaults under `<root>`, each overridable.
///
/// # Errors
/// All errors use `anyhow::Error` with context and are surfaced at the CLI boundary.
use anyhow::{bail, Context, Result};
use regcard_uploader_core::config::{Environment, InputPaths, RunConfig};
use regcard_uploader_core::contract::{PromptError, SettingsPrompt};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub const BASE_URL_VAR: &str = "API_BASE_URL";
pub const TOKEN_VAR: &str = "BEARER_TOKEN";

/// Values the operator may pin on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: PathBuf,
    pub environment: Option<Environment>,
    pub base_url: Option<String>,
    pub reg_cards_dir: Option<PathBuf>,
    pub property_map: Option<PathBuf>,
    pub field_mapping: Option<PathBuf>,
}

pub fn load_config<P>(overrides: &ConfigOverrides, prompt: &P) -> Result<RunConfig>
where
    P: SettingsPrompt + ?Sized,
{
    let environment = resolve_environment(overrides, prompt)?;
    load_env_file(overrides, environment)?;

    let base_url = match overrides.base_url.clone().or_else(|| non_empty_var(BASE_URL_VAR)) {
        Some(url) => url.trim().trim_end_matches('/').to_string(),
        None => {
            error!(environment = %environment, "[CONFIG] No API base URL configured");
            bail!(
                "API base URL not configured: pass --base-url or set {BASE_URL_VAR} in env/{}",
                environment.env_file_name()
            );
        }
    };

    let token = match non_empty_var(TOKEN_VAR) {
        Some(token) => {
            info!("[CONFIG] {TOKEN_VAR} found in env");
            token
        }
        None => prompt
            .bearer_token()
            .context("Failed to obtain bearer token")?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("Bearer token must not be empty");
    }

    let defaults = InputPaths::for_environment(&overrides.root, environment);
    let paths = InputPaths {
        reg_cards_dir: overrides
            .reg_cards_dir
            .clone()
            .unwrap_or(defaults.reg_cards_dir),
        property_map: overrides
            .property_map
            .clone()
            .unwrap_or(defaults.property_map),
        field_mapping: overrides
            .field_mapping
            .clone()
            .unwrap_or(defaults.field_mapping),
    };

    let config = RunConfig {
        environment,
        base_url,
        token,
        paths,
    };
    config.trace_loaded();
    Ok(config)
}

fn resolve_environment<P>(overrides: &ConfigOverrides, prompt: &P) -> Result<Environment>
where
    P: SettingsPrompt + ?Sized,
{
    if let Some(environment) = overrides.environment {
        info!(environment = %environment, "[CONFIG] Environment given on command line");
        return Ok(environment);
    }
    match prompt.select_environment(&Environment::ALL) {
        Ok(environment) => {
            info!(environment = %environment, "[CONFIG] Environment selected interactively");
            Ok(environment)
        }
        Err(PromptError::NotInteractive(_)) => {
            let environment = Environment::default();
            warn!(environment = %environment, "[CONFIG] No terminal to choose environment, using default");
            Ok(environment)
        }
        Err(e) => Err(e).context("Failed to select environment"),
    }
}

fn load_env_file(overrides: &ConfigOverrides, environment: Environment) -> Result<()> {
    let path = overrides.root.join("env").join(environment.env_file_name());
    if !path.exists() {
        info!(env_file = %path.display(), "[CONFIG] No environment file, relying on process environment");
        return Ok(());
    }
    dotenvy::from_path(&path)
        .with_context(|| format!("Failed to load environment file {}", path.display()))?;
    info!(env_file = %path.display(), "[CONFIG] Loaded environment file");
    Ok(())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
