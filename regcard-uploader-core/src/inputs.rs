//! Loading of the local inputs: the registration card directory, the
//! property-name → property-id map and the field-mapping definition.
//!
//! Every loader fails with an [`InputError`]; callers treat all of them as
//! fatal for the run, before any upload is attempted.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("missing {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'parameter_mappings' array missing in {}", .0.display())]
    MissingMappings(PathBuf),

    #[error("no PDF files found in {}", .0.display())]
    NoPdfFiles(PathBuf),
}

/// Property name (registration card file stem) → property identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, String>);

impl PropertyMap {
    /// Identifier for `property_name`. Blank identifiers count as absent.
    pub fn lookup(&self, property_name: &str) -> Option<&str> {
        self.0
            .get(property_name)
            .map(String::as_str)
            .filter(|id| !id.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PropertyMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn read_existing(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        error!(path = %path.display(), "[INPUT] Required input file is missing");
        return Err(InputError::Missing(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the property-name → identifier map (a flat JSON object of strings).
pub fn load_property_map(path: &Path) -> Result<PropertyMap, InputError> {
    let content = read_existing(path)?;
    let map: PropertyMap = serde_json::from_str(&content).map_err(|source| {
        error!(path = %path.display(), error = %source, "[INPUT] Property map is not valid JSON");
        InputError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), properties = map.len(), "[INPUT] Loaded property map");
    Ok(map)
}

/// Load the `parameter_mappings` array from the field-mapping file.
///
/// Records are kept as opaque JSON and forwarded untouched.
pub fn load_field_mapping(path: &Path) -> Result<Vec<Value>, InputError> {
    let content = read_existing(path)?;
    let json: Value = serde_json::from_str(&content).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match json.get("parameter_mappings").and_then(Value::as_array) {
        Some(mappings) => {
            info!(path = %path.display(), mappings = mappings.len(), "[INPUT] Loaded field mapping");
            Ok(mappings.clone())
        }
        None => {
            error!(path = %path.display(), "[INPUT] 'parameter_mappings' array missing");
            Err(InputError::MissingMappings(path.to_path_buf()))
        }
    }
}

/// Regular files in `dir` with a `.pdf` extension, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !dir.is_dir() {
        error!(dir = %dir.display(), "[INPUT] Registration card directory is missing");
        return Err(InputError::Missing(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| InputError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if pdfs.is_empty() {
        error!(dir = %dir.display(), "[INPUT] No PDF files found");
        return Err(InputError::NoPdfFiles(dir.to_path_buf()));
    }
    info!(dir = %dir.display(), files = pdfs.len(), "[INPUT] Found registration cards");
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("pdf")
}

/// Property name encoded in a registration card's file name (`Hotel123.pdf` → `Hotel123`).
///
/// Bytes that are not valid UTF-8 are replaced, so every listed card has a name.
pub fn property_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}
