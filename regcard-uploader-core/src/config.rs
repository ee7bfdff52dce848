use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Deployment region the registration cards are uploaded to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Na,
    Emea,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Na, Environment::Emea];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Na => "NA",
            Environment::Emea => "EMEA",
        }
    }

    /// Name of the dotenv file holding this environment's settings, e.g. `.env.na`.
    pub fn env_file_name(&self) -> String {
        format!(".env.{}", self.as_str().to_lowercase())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NA" => Ok(Environment::Na),
            "EMEA" => Ok(Environment::Emea),
            other => Err(format!("unknown environment '{other}', expected NA or EMEA")),
        }
    }
}

/// Locations of the local inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub reg_cards_dir: PathBuf,
    pub property_map: PathBuf,
    pub field_mapping: PathBuf,
}

impl InputPaths {
    pub const DEFAULT_PROPERTY_MAP: &'static str = "property_id_map.json";
    pub const DEFAULT_FIELD_MAPPING: &'static str = "field_mapping_stage.json";

    /// Default layout relative to `root`: `reg_cards/<ENV>/` plus the two JSON files.
    pub fn for_environment(root: &Path, environment: Environment) -> Self {
        Self {
            reg_cards_dir: root.join("reg_cards").join(environment.as_str()),
            property_map: root.join(Self::DEFAULT_PROPERTY_MAP),
            field_mapping: root.join(Self::DEFAULT_FIELD_MAPPING),
        }
    }
}

/// Everything a run needs, resolved once up front and passed down explicitly.
#[derive(Clone)]
pub struct RunConfig {
    pub environment: Environment,
    pub base_url: String,
    pub token: String,
    pub paths: InputPaths,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("paths", &self.paths)
            .finish()
    }
}

impl RunConfig {
    pub fn trace_loaded(&self) {
        info!(
            environment = %self.environment,
            base_url = %self.base_url,
            reg_cards_dir = %self.paths.reg_cards_dir.display(),
            "Loaded RunConfig"
        );
        debug!(?self, "RunConfig loaded (full debug)");
    }
}
