pub mod api;
pub mod error;
pub mod github;
pub mod publisher;
pub mod release;

pub use error::PublishError;
pub use github::GitHubApi;
pub use publisher::{dry_run_result, ReleasePublisher};
pub use release::{
    validate, AccessToken, Credentials, ReleaseRequest, ReleaseResult, ASSET_CONTENT_TYPE,
    DEFAULT_API_ENDPOINT, DEFAULT_TITLE,
};
