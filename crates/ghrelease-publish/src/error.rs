use std::path::PathBuf;

/// Terminal failure of one publish invocation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("github authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("failed to connect to github: {0}")]
    ConnectionFailed(String),
    #[error("repository '{0}' not found")]
    RepositoryNotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("a release for tag '{tag}' already exists")]
    ReleaseAlreadyExists { tag: String },
    #[error("github rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("failed to upload asset '{}': {reason}", file.display())]
    AssetUploadFailed { file: PathBuf, reason: String },
}

impl PublishError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PublishError::Configuration(message.into())
    }

    /// True when the error was raised before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, PublishError::Configuration(_))
    }
}
