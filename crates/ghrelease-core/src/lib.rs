//! Configuration layer for ghrelease: `ghrelease.yaml`, project version
//! lookup and release types.

pub mod config;
pub mod project;
pub mod release_type;

pub use config::{load, ConfigError, GithubSettings, LoadedConfig, ResolvedRelease, CONFIG_FILE};
pub use project::project_version;
pub use release_type::ReleaseType;
