use std::fs;
use std::path::Path;

use log::{debug, info};
use rand_core::{OsRng, RngCore};

use crate::api::{AssetUpload, NewRelease, ReleaseApi, ReleaseHandle, ReleaseSession};
use crate::error::PublishError;
use crate::release::{
    asset_name, validate, validate_repository, Credentials, ReleaseRequest, ReleaseResult,
    ASSET_CONTENT_TYPE,
};

/// Creates one release and uploads its files, stopping at the first error.
pub struct ReleasePublisher<A> {
    api: A,
}

impl<A: ReleaseApi> ReleasePublisher<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn publish(
        &self,
        request: &ReleaseRequest,
        credentials: &Credentials,
    ) -> Result<ReleaseResult, PublishError> {
        validate(request)?;

        info!("connecting to {}", credentials.endpoint());
        let session = self.api.connect(credentials)?;
        let repository = session.repository(&request.repository)?;

        if session
            .release_by_tag(&repository, &request.tag_name)?
            .is_some()
        {
            return Err(PublishError::ReleaseAlreadyExists {
                tag: request.tag_name.clone(),
            });
        }

        info!(
            "creating release '{}' on {} from {}",
            request.tag_name, repository.full_name, request.commitish
        );
        let release = session.create_release(
            &repository,
            &NewRelease {
                tag_name: request.tag_name.clone(),
                target_commitish: request.commitish.clone(),
                name: request.display_name.clone(),
                body: request.body.clone(),
                draft: false,
                prerelease: request.prerelease,
            },
        )?;

        for file in &request.files {
            upload_file(&session, &release, file)?;
        }
        info!(
            "published release {} with {} asset(s): {}",
            release.id,
            request.files.len(),
            release.html_url
        );

        Ok(ReleaseResult {
            repository: request.repository.clone(),
            release_id: release.id,
            url: release.html_url,
            title: request.result_title(),
        })
    }
}

fn upload_file<S: ReleaseSession>(
    session: &S,
    release: &ReleaseHandle,
    file: &Path,
) -> Result<(), PublishError> {
    let upload_failed = |reason: String| PublishError::AssetUploadFailed {
        file: file.to_path_buf(),
        reason,
    };
    let name = asset_name(file)?.to_string();
    let bytes =
        fs::read(file).map_err(|err| upload_failed(format!("failed to read file: {}", err)))?;
    debug!("uploading {} ({} bytes)", name, bytes.len());
    let asset = AssetUpload {
        name,
        content_type: ASSET_CONTENT_TYPE.to_string(),
        bytes,
    };
    match session.upload_asset(release, asset) {
        Ok(uploaded) => {
            debug!("uploaded {} as asset {}", uploaded.name, uploaded.id);
            Ok(())
        }
        Err(PublishError::AssetUploadFailed { reason, .. }) => Err(upload_failed(reason)),
        Err(err) => Err(upload_failed(err.to_string())),
    }
}

/// Synthetic result for planning runs. Makes no network call.
pub fn dry_run_result(request: &ReleaseRequest) -> Result<ReleaseResult, PublishError> {
    validate_repository(&request.repository)?;
    let url = format!(
        "https://github.com/{}/releases/tag/{}?dry-run={}",
        request.repository,
        request.tag_name,
        OsRng.next_u64()
    );
    Ok(ReleaseResult {
        repository: request.repository.clone(),
        release_id: 0,
        url,
        title: request.result_title(),
    })
}
