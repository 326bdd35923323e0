use std::path::Path;

use ghrelease_core::{config, project_version, GithubSettings, ResolvedRelease};
use ghrelease_publish::ReleaseRequest;

pub struct PreparedRelease {
    pub request: ReleaseRequest,
    pub api_endpoint: Option<String>,
}

/// Merges `ghrelease.yaml` (if any) with command-line overrides and builds
/// the request. Nothing here touches the network.
pub fn prepare(project_dir: &Path, overrides: GithubSettings) -> Result<PreparedRelease, String> {
    let (base_dir, settings) = match config::load(project_dir).map_err(|err| err.to_string())? {
        Some(loaded) => {
            log::info!("using {}", loaded.path.display());
            (loaded.base_dir, loaded.github.override_with(overrides))
        }
        None => (project_dir.to_path_buf(), overrides),
    };
    // A crate inside a workspace carries its own version; the config may sit
    // next to a virtual manifest.
    let version = match project_version(project_dir).map_err(|err| err.to_string())? {
        Some(version) => Some(version),
        None => project_version(&base_dir).map_err(|err| err.to_string())?,
    };
    let resolved = settings
        .resolve(&base_dir, version)
        .map_err(|err| err.to_string())?;
    Ok(into_request(resolved))
}

fn into_request(resolved: ResolvedRelease) -> PreparedRelease {
    let files = ReleaseRequest::collect_files(&resolved.additional_files, resolved.file.as_deref());
    PreparedRelease {
        request: ReleaseRequest {
            repository: resolved.repository,
            tag_name: resolved.tag_name,
            commitish: resolved.commitish,
            display_name: resolved.display_name,
            title: resolved.announcement_title,
            body: resolved.changelog,
            prerelease: resolved.release_type.is_prerelease(),
            files,
        },
        api_endpoint: resolved.api_endpoint,
    }
}
