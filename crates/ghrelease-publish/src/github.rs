use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::api::{
    AssetUpload, NewRelease, ReleaseApi, ReleaseHandle, ReleaseSession, RepositoryHandle,
    UploadedAsset,
};
use crate::error::PublishError;
use crate::release::{AccessToken, Credentials};

const USER_AGENT: &str = "ghrelease";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST v3 client on `reqwest::blocking`.
#[derive(Clone, Debug, Default)]
pub struct GitHubApi {
    timeout: Option<Duration>,
}

impl GitHubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies to every request of the session, uploads included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_client(&self) -> Result<Client, PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|err| {
            PublishError::ConnectionFailed(format!("failed to build client: {}", err))
        })
    }
}

impl ReleaseApi for GitHubApi {
    type Session = GitHubSession;

    fn connect(&self, credentials: &Credentials) -> Result<GitHubSession, PublishError> {
        let session = GitHubSession {
            client: self.build_client()?,
            token: credentials.access_token.clone(),
            base_url: credentials.endpoint().to_string(),
        };
        let url = session.api_url(&["rate_limit"])?;
        let response = session.send(session.get(url))?;
        match response.status() {
            status if status.is_success() => Ok(session),
            // GitHub Enterprise answers 404 when rate limiting is disabled.
            StatusCode::NOT_FOUND => Ok(session),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PublishError::AuthenticationFailed(format!(
                    "token rejected by {}",
                    session.base_url
                )))
            }
            status => Err(PublishError::ConnectionFailed(format!(
                "{} answered {}: {}",
                session.base_url,
                status.as_u16(),
                error_message(response)
            ))),
        }
    }
}

pub struct GitHubSession {
    client: Client,
    token: AccessToken,
    base_url: String,
}

impl GitHubSession {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the endpoint, keeping any
    /// base path such as `/api/v3`.
    fn api_url(&self, segments: &[&str]) -> Result<Url, PublishError> {
        let invalid = || {
            PublishError::ConnectionFailed(format!("invalid api endpoint '{}'", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repository_url(&self, full_name: &str, rest: &[&str]) -> Result<Url, PublishError> {
        let mut segments = vec!["repos"];
        segments.extend(full_name.split('/'));
        segments.extend_from_slice(rest);
        self.api_url(&segments)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url).bearer_auth(self.token.expose())
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, PublishError> {
        request
            .send()
            .map_err(|err| PublishError::ConnectionFailed(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: u64,
    html_url: String,
    upload_url: String,
}

impl From<ReleaseResponse> for ReleaseHandle {
    fn from(value: ReleaseResponse) -> Self {
        ReleaseHandle {
            id: value.id,
            html_url: value.html_url,
            upload_url: value.upload_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    id: u64,
    name: String,
    size: u64,
}

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
}

impl ReleaseSession for GitHubSession {
    fn repository(&self, id: &str) -> Result<RepositoryHandle, PublishError> {
        let response = self.send(self.get(self.repository_url(id, &[])?))?;
        match response.status() {
            status if status.is_success() => {
                let parsed: RepositoryResponse = parse(response)?;
                Ok(RepositoryHandle {
                    full_name: parsed.full_name,
                })
            }
            StatusCode::NOT_FOUND => Err(PublishError::RepositoryNotFound(id.to_string())),
            StatusCode::FORBIDDEN => Err(PublishError::PermissionDenied(format!(
                "no access to repository '{}'",
                id
            ))),
            StatusCode::UNAUTHORIZED => {
                Err(PublishError::AuthenticationFailed("token rejected".to_string()))
            }
            _ => Err(remote_error(response)),
        }
    }

    fn release_by_tag(
        &self,
        repository: &RepositoryHandle,
        tag: &str,
    ) -> Result<Option<ReleaseHandle>, PublishError> {
        let url = self.repository_url(&repository.full_name, &["releases", "tags", tag])?;
        let response = self.send(self.get(url))?;
        match response.status() {
            status if status.is_success() => {
                Ok(Some(parse::<ReleaseResponse>(response)?.into()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(remote_error(response)),
        }
    }

    fn create_release(
        &self,
        repository: &RepositoryHandle,
        release: &NewRelease,
    ) -> Result<ReleaseHandle, PublishError> {
        let url = self.repository_url(&repository.full_name, &["releases"])?;
        let payload = CreateReleaseRequest {
            tag_name: &release.tag_name,
            target_commitish: &release.target_commitish,
            name: &release.name,
            body: &release.body,
            draft: release.draft,
            prerelease: release.prerelease,
        };
        let response = self.send(
            self.client
                .post(url)
                .bearer_auth(self.token.expose())
                .json(&payload),
        )?;
        match response.status() {
            status if status.is_success() => Ok(parse::<ReleaseResponse>(response)?.into()),
            StatusCode::FORBIDDEN => Err(PublishError::PermissionDenied(format!(
                "cannot create releases on '{}'",
                repository.full_name
            ))),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let status = response.status().as_u16();
                let error = response.json::<ErrorResponse>().unwrap_or_default();
                if error.errors.iter().any(|detail| detail.code == "already_exists") {
                    Err(PublishError::ReleaseAlreadyExists {
                        tag: release.tag_name.clone(),
                    })
                } else {
                    Err(PublishError::Remote {
                        status,
                        message: error.message,
                    })
                }
            }
            _ => Err(remote_error(response)),
        }
    }

    fn upload_asset(
        &self,
        release: &ReleaseHandle,
        asset: AssetUpload,
    ) -> Result<UploadedAsset, PublishError> {
        let AssetUpload {
            name,
            content_type,
            bytes,
        } = asset;
        let upload_failed = |reason: String| PublishError::AssetUploadFailed {
            file: name.clone().into(),
            reason,
        };
        let url = upload_endpoint(&release.upload_url);
        debug!("POST {}?name={}", url, name);
        let response = self
            .client
            .post(url)
            .query(&[("name", name.as_str())])
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .map_err(|err| upload_failed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(upload_failed(remote_error(response).to_string()));
        }
        let parsed: AssetResponse = response
            .json()
            .map_err(|err| upload_failed(format!("unexpected response: {}", err)))?;
        Ok(UploadedAsset {
            id: parsed.id,
            name: parsed.name,
            size: parsed.size,
        })
    }
}

/// Drops the `{?name,label}` URI template GitHub appends to upload URLs.
fn upload_endpoint(upload_url: &str) -> &str {
    upload_url.split('{').next().unwrap_or(upload_url)
}

fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, PublishError> {
    let status = response.status().as_u16();
    response.json::<T>().map_err(|err| PublishError::Remote {
        status,
        message: format!("unexpected response body: {}", err),
    })
}

fn remote_error(response: Response) -> PublishError {
    let status = response.status().as_u16();
    PublishError::Remote {
        status,
        message: error_message(response),
    }
}

fn error_message(response: Response) -> String {
    response
        .json::<ErrorResponse>()
        .map(|error| error.message)
        .unwrap_or_default()
}
