use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ghrelease_core::GithubSettings;
use ghrelease_publish::{dry_run_result, Credentials, GitHubApi, ReleasePublisher, ReleaseResult};

use crate::commands::request::prepare;

pub struct PublishArgs {
    pub project_dir: PathBuf,
    pub overrides: GithubSettings,
    /// Only required when `dry_run` is false.
    pub github_token: Option<String>,
    pub dry_run: bool,
    pub timeout: Option<Duration>,
    pub result_file: Option<PathBuf>,
}

pub fn run(args: PublishArgs) -> Result<ReleaseResult, String> {
    let prepared = prepare(&args.project_dir, args.overrides)?;

    let result = if args.dry_run {
        log::info!("dry run: skipping release creation");
        dry_run_result(&prepared.request).map_err(|err| err.to_string())?
    } else {
        let token = args
            .github_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| "Missing GITHUB_TOKEN environment variable".to_string())?;
        let mut credentials = Credentials::new(token);
        credentials.api_endpoint = prepared.api_endpoint;

        let mut api = GitHubApi::new();
        if let Some(timeout) = args.timeout {
            api = api.with_timeout(timeout);
        }
        ReleasePublisher::new(api)
            .publish(&prepared.request, &credentials)
            .map_err(|err| err.to_string())?
    };

    if let Some(path) = &args.result_file {
        write_result(path, &result)?;
    }
    Ok(result)
}

fn write_result(path: &Path, result: &ReleaseResult) -> Result<(), String> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|err| format!("failed to serialize result: {}", err))?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create '{}': {}", parent.display(), err))?;
    }
    fs::write(path, json)
        .map_err(|err| format!("failed to write result '{}': {}", path.display(), err))
}
