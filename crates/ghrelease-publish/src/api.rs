//! Narrow boundary to the hosting platform's release API.
//!
//! The publisher only talks to these traits, so the HTTP client can be
//! swapped out or replaced by a test double.

use crate::error::PublishError;
use crate::release::Credentials;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// "owner/repo" as reported by the remote side.
    pub full_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseHandle {
    pub id: u64,
    pub html_url: String,
    /// May still carry the `{?name,label}` URI template suffix.
    pub upload_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedAsset {
    pub id: u64,
    pub name: String,
    pub size: u64,
}

pub trait ReleaseApi {
    type Session: ReleaseSession;

    /// Establishes an authenticated session against `credentials.endpoint()`.
    fn connect(&self, credentials: &Credentials) -> Result<Self::Session, PublishError>;
}

pub trait ReleaseSession {
    fn repository(&self, id: &str) -> Result<RepositoryHandle, PublishError>;

    fn release_by_tag(
        &self,
        repository: &RepositoryHandle,
        tag: &str,
    ) -> Result<Option<ReleaseHandle>, PublishError>;

    fn create_release(
        &self,
        repository: &RepositoryHandle,
        release: &NewRelease,
    ) -> Result<ReleaseHandle, PublishError>;

    fn upload_asset(
        &self,
        release: &ReleaseHandle,
        asset: AssetUpload,
    ) -> Result<UploadedAsset, PublishError>;
}
