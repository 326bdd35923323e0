use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::release_type::ReleaseType;

pub const CONFIG_FILE: &str = "ghrelease.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to parse '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("github.{field} is required")]
    MissingField { field: &'static str },
    #[error("github.{first} and github.{second} cannot both be set")]
    ConflictingFields {
        first: &'static str,
        second: &'static str,
    },
}

#[derive(Debug, Default, Deserialize)]
struct GhreleaseConfig {
    #[serde(default)]
    github: Option<GithubSettings>,
}

/// The `github:` section of `ghrelease.yaml`. Every field is optional here;
/// [`GithubSettings::resolve`] enforces what a release needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct GithubSettings {
    /// "owner/repo"
    pub repository: Option<String>,
    pub commitish: Option<String>,
    pub tag_name: Option<String>,
    pub api_endpoint: Option<String>,
    pub version: Option<String>,
    pub display_name: Option<String>,
    pub announcement_title: Option<String>,
    pub changelog: Option<String>,
    pub changelog_file: Option<PathBuf>,
    #[serde(rename = "type")]
    pub release_type: Option<ReleaseType>,
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub additional_files: Vec<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
    pub github: GithubSettings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub repository: String,
    pub tag_name: String,
    pub commitish: String,
    pub api_endpoint: Option<String>,
    pub display_name: String,
    pub announcement_title: Option<String>,
    pub changelog: String,
    pub release_type: ReleaseType,
    pub file: Option<PathBuf>,
    pub additional_files: Vec<PathBuf>,
}

/// Finds `ghrelease.yaml` in `project_dir` or the nearest ancestor.
pub fn load(project_dir: &Path) -> Result<Option<LoadedConfig>, ConfigError> {
    let mut current = Some(project_dir);
    while let Some(dir) = current {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            return read_config(&path, dir).map(Some);
        }
        current = dir.parent();
    }
    Ok(None)
}

fn read_config(path: &Path, base_dir: &Path) -> Result<LoadedConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GhreleaseConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("loaded {}", path.display());
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        base_dir: base_dir.to_path_buf(),
        github: config.github.unwrap_or_default(),
    })
}

impl GithubSettings {
    /// Fields set on `other` replace ours; a non-empty file list replaces ours.
    pub fn override_with(mut self, other: GithubSettings) -> GithubSettings {
        fn take<T>(ours: &mut Option<T>, theirs: Option<T>) {
            if theirs.is_some() {
                *ours = theirs;
            }
        }
        take(&mut self.repository, other.repository);
        take(&mut self.commitish, other.commitish);
        take(&mut self.tag_name, other.tag_name);
        take(&mut self.api_endpoint, other.api_endpoint);
        take(&mut self.version, other.version);
        take(&mut self.display_name, other.display_name);
        take(&mut self.announcement_title, other.announcement_title);
        take(&mut self.release_type, other.release_type);
        take(&mut self.file, other.file);
        if other.changelog.is_some() || other.changelog_file.is_some() {
            self.changelog = other.changelog;
            self.changelog_file = other.changelog_file;
        }
        if !other.additional_files.is_empty() {
            self.additional_files = other.additional_files;
        }
        self
    }

    /// Applies defaults: tag name and display name fall back to the version,
    /// which falls back to `project_version`.
    pub fn resolve(
        self,
        base_dir: &Path,
        project_version: Option<String>,
    ) -> Result<ResolvedRelease, ConfigError> {
        let repository = required(self.repository, "repository")?;
        let commitish = required(self.commitish, "commitish")?;
        let version = non_empty(self.version).or(project_version);
        let tag_name = non_empty(self.tag_name)
            .or_else(|| version.clone())
            .ok_or(ConfigError::MissingField { field: "tag_name" })?;
        let display_name = non_empty(self.display_name)
            .or(version)
            .unwrap_or_else(|| tag_name.clone());

        let changelog = match (self.changelog, self.changelog_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingFields {
                    first: "changelog",
                    second: "changelog_file",
                })
            }
            (Some(text), None) => text,
            (None, Some(file)) => {
                let path = base_dir.join(file);
                fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?
            }
            (None, None) => String::new(),
        };

        Ok(ResolvedRelease {
            repository,
            tag_name,
            commitish,
            api_endpoint: non_empty(self.api_endpoint),
            display_name,
            announcement_title: non_empty(self.announcement_title),
            changelog,
            release_type: self.release_type.unwrap_or_default(),
            file: self.file.map(|file| base_dir.join(file)),
            additional_files: self
                .additional_files
                .into_iter()
                .map(|file| base_dir.join(file))
                .collect(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingField { field })
}
