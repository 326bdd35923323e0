use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Title reported when the request carries no announcement title.
pub const DEFAULT_TITLE: &str = "Download from GitHub";

/// Content type sent for every asset, whatever its extension.
pub const ASSET_CONTENT_TYPE: &str = "application/java-archive";

pub const DEFAULT_API_ENDPOINT: &str = "https://api.github.com";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// "owner/repo"
    pub repository: String,
    pub tag_name: String,
    /// Branch or commit SHA the tag is created from.
    pub commitish: String,
    /// Release name shown on GitHub.
    pub display_name: String,
    /// Announcement title echoed into the result.
    pub title: Option<String>,
    pub body: String,
    pub prerelease: bool,
    pub files: Vec<PathBuf>,
}

impl ReleaseRequest {
    /// Additional files keep their declared order; the primary file goes last.
    pub fn collect_files(
        additional_files: &[PathBuf],
        primary_file: Option<&Path>,
    ) -> Vec<PathBuf> {
        let mut files = additional_files.to_vec();
        if let Some(file) = primary_file {
            files.push(file.to_path_buf());
        }
        files
    }

    pub fn result_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub repository: String,
    pub release_id: u64,
    pub url: String,
    pub title: String,
}

/// Secret token. Never printed, not even through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub access_token: AccessToken,
    /// Overrides the public API host, e.g. GitHub Enterprise.
    pub api_endpoint: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken::new(access_token),
            api_endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_API_ENDPOINT)
            .trim_end_matches('/')
    }
}

/// Local checks run before any network activity.
pub fn validate(request: &ReleaseRequest) -> Result<(), PublishError> {
    validate_repository(&request.repository)?;
    if request.tag_name.trim().is_empty() {
        return Err(PublishError::configuration("tag name is required"));
    }
    if request.commitish.trim().is_empty() {
        return Err(PublishError::configuration("commitish is required"));
    }
    if request.files.is_empty() {
        return Err(PublishError::configuration("No files to upload to GitHub."));
    }
    for file in &request.files {
        if !file.is_file() {
            return Err(PublishError::configuration(format!(
                "file '{}' does not exist",
                file.display()
            )));
        }
        asset_name(file)?;
    }
    Ok(())
}

pub(crate) fn validate_repository(repository: &str) -> Result<(), PublishError> {
    if repository.trim().is_empty() {
        return Err(PublishError::configuration("repository is required"));
    }
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(PublishError::configuration(format!(
            "repository '{}' must look like 'owner/repo'",
            repository
        ))),
    }
}

pub(crate) fn asset_name(path: &Path) -> Result<&str, PublishError> {
    path.file_name()
        .and_then(|value| value.to_str())
        .ok_or_else(|| {
            PublishError::configuration(format!("file '{}' has no usable name", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(files: Vec<PathBuf>) -> ReleaseRequest {
        ReleaseRequest {
            repository: "octo/mod".to_string(),
            tag_name: "1.0.0".to_string(),
            commitish: "main".to_string(),
            display_name: "Mod 1.0.0".to_string(),
            title: None,
            body: String::new(),
            prerelease: false,
            files,
        }
    }

    #[test]
    fn primary_file_is_appended_after_additional_files() {
        let additional = vec![PathBuf::from("a.jar"), PathBuf::from("b.jar")];
        let files = ReleaseRequest::collect_files(&additional, Some(Path::new("main.jar")));
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.jar"),
                PathBuf::from("b.jar"),
                PathBuf::from("main.jar")
            ]
        );
        assert!(ReleaseRequest::collect_files(&[], None).is_empty());
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let error = validate(&request_with(vec![])).expect_err("error");
        assert!(error.is_configuration());
        assert!(error.to_string().contains("No files to upload"));
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = validate(&request_with(vec![dir.path().join("gone.jar")])).expect_err("error");
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn malformed_repository_is_rejected() {
        for repository in ["", "octo", "octo/", "/mod", "a/b/c"] {
            let mut request = request_with(vec![]);
            request.repository = repository.to_string();
            let error = validate(&request).expect_err("error");
            assert!(error.is_configuration(), "{}", repository);
        }
    }

    #[test]
    fn existing_files_pass_validation() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("mod.jar");
        std::fs::write(&file, b"jar").expect("write");
        validate(&request_with(vec![file])).expect("valid");
    }

    #[test]
    fn title_falls_back_to_default() {
        let mut request = request_with(vec![]);
        assert_eq!(request.result_title(), DEFAULT_TITLE);
        request.title = Some("Release!".to_string());
        assert_eq!(request.result_title(), "Release!");
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let credentials = Credentials::new("ghp_secret");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn endpoint_defaults_to_public_api() {
        assert_eq!(Credentials::new("t").endpoint(), DEFAULT_API_ENDPOINT);
        let custom = Credentials::new("t").with_endpoint("https://ghe.example.com/api/v3/");
        assert_eq!(custom.endpoint(), "https://ghe.example.com/api/v3");
    }
}
