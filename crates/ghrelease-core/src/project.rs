use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

#[derive(Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    version: Option<toml::Value>,
}

/// `[package].version` from the project's `Cargo.toml`, if it declares one.
///
/// Workspace-inherited versions (`version.workspace = true`) are not
/// resolved and yield `None`.
pub fn project_version(project_dir: &Path) -> Result<Option<String>, ConfigError> {
    let path = project_dir.join("Cargo.toml");
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed: CargoToml = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.clone(),
        source,
    })?;
    Ok(parsed
        .package
        .and_then(|package| package.version)
        .and_then(|version| version.as_str().map(str::to_string)))
}
