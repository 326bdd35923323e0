use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ghrelease_publish::api::{
    AssetUpload, NewRelease, ReleaseApi, ReleaseHandle, ReleaseSession, RepositoryHandle,
    UploadedAsset,
};
use ghrelease_publish::{
    dry_run_result, Credentials, PublishError, ReleasePublisher, ReleaseRequest,
    ASSET_CONTENT_TYPE, DEFAULT_API_ENDPOINT, DEFAULT_TITLE,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Connect { endpoint: String },
    Repository(String),
    ReleaseByTag(String),
    CreateRelease(NewRelease),
    Upload { name: String, content_type: String },
}

#[derive(Default)]
struct MockApi {
    calls: Rc<RefCell<Vec<Call>>>,
    connect_error: Option<PublishError>,
    existing_release: bool,
    fail_upload_at: Option<usize>,
}

impl MockApi {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }
}

struct MockSession {
    calls: Rc<RefCell<Vec<Call>>>,
    existing_release: bool,
    fail_upload_at: Option<usize>,
}

impl ReleaseApi for MockApi {
    type Session = MockSession;

    fn connect(&self, credentials: &Credentials) -> Result<MockSession, PublishError> {
        self.calls.borrow_mut().push(Call::Connect {
            endpoint: credentials.endpoint().to_string(),
        });
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }
        Ok(MockSession {
            calls: Rc::clone(&self.calls),
            existing_release: self.existing_release,
            fail_upload_at: self.fail_upload_at,
        })
    }
}

impl ReleaseSession for MockSession {
    fn repository(&self, id: &str) -> Result<RepositoryHandle, PublishError> {
        self.calls.borrow_mut().push(Call::Repository(id.to_string()));
        Ok(RepositoryHandle {
            full_name: id.to_string(),
        })
    }

    fn release_by_tag(
        &self,
        _repository: &RepositoryHandle,
        tag: &str,
    ) -> Result<Option<ReleaseHandle>, PublishError> {
        self.calls.borrow_mut().push(Call::ReleaseByTag(tag.to_string()));
        Ok(self.existing_release.then(|| ReleaseHandle {
            id: 7,
            html_url: "https://x/7".to_string(),
            upload_url: "https://uploads.x/7/assets{?name,label}".to_string(),
        }))
    }

    fn create_release(
        &self,
        _repository: &RepositoryHandle,
        release: &NewRelease,
    ) -> Result<ReleaseHandle, PublishError> {
        self.calls
            .borrow_mut()
            .push(Call::CreateRelease(release.clone()));
        Ok(ReleaseHandle {
            id: 42,
            html_url: "https://x/42".to_string(),
            upload_url: "https://uploads.x/42/assets{?name,label}".to_string(),
        })
    }

    fn upload_asset(
        &self,
        _release: &ReleaseHandle,
        asset: AssetUpload,
    ) -> Result<UploadedAsset, PublishError> {
        let mut calls = self.calls.borrow_mut();
        calls.push(Call::Upload {
            name: asset.name.clone(),
            content_type: asset.content_type.clone(),
        });
        let attempt = calls
            .iter()
            .filter(|call| matches!(call, Call::Upload { .. }))
            .count();
        if self.fail_upload_at == Some(attempt) {
            return Err(PublishError::Remote {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(UploadedAsset {
            id: attempt as u64,
            name: asset.name.clone(),
            size: asset.bytes.len() as u64,
        })
    }
}

fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, format!("contents of {}", name)).expect("write file");
            path
        })
        .collect()
}

fn request(files: Vec<PathBuf>) -> ReleaseRequest {
    ReleaseRequest {
        repository: "octo/mod".to_string(),
        tag_name: "1.2.0".to_string(),
        commitish: "main".to_string(),
        display_name: "Mod 1.2.0".to_string(),
        title: None,
        body: "- fixed things".to_string(),
        prerelease: true,
        files,
    }
}

#[test]
fn empty_file_list_makes_no_network_calls() {
    let publisher = ReleasePublisher::new(MockApi::default());
    let error = publisher
        .publish(&request(vec![]), &Credentials::new("token"))
        .expect_err("error");
    assert!(matches!(error, PublishError::Configuration(_)));
    assert!(publisher.api().calls().is_empty());
}

#[test]
fn publishes_release_and_uploads_in_request_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["z-sources.jar", "a-dev.jar", "mod.jar"]);
    let publisher = ReleasePublisher::new(MockApi::default());

    let result = publisher
        .publish(&request(files), &Credentials::new("token"))
        .expect("publish");

    assert_eq!(result.release_id, 42);
    assert_eq!(result.url, "https://x/42");
    assert_eq!(result.repository, "octo/mod");
    assert_eq!(result.title, DEFAULT_TITLE);
    assert_eq!(
        publisher.api().uploads(),
        vec!["z-sources.jar", "a-dev.jar", "mod.jar"]
    );

    let calls = publisher.api().calls();
    assert_eq!(
        calls[0],
        Call::Connect {
            endpoint: DEFAULT_API_ENDPOINT.to_string()
        }
    );
    assert_eq!(calls[1], Call::Repository("octo/mod".to_string()));
    assert_eq!(calls[2], Call::ReleaseByTag("1.2.0".to_string()));
    assert_eq!(
        calls[3],
        Call::CreateRelease(NewRelease {
            tag_name: "1.2.0".to_string(),
            target_commitish: "main".to_string(),
            name: "Mod 1.2.0".to_string(),
            body: "- fixed things".to_string(),
            draft: false,
            prerelease: true,
        })
    );
    for call in &calls[4..] {
        match call {
            Call::Upload { content_type, .. } => assert_eq!(content_type, ASSET_CONTENT_TYPE),
            other => panic!("unexpected call after create: {:?}", other),
        }
    }
}

#[test]
fn failed_upload_aborts_remaining_uploads() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["one.jar", "two.jar", "three.jar"]);
    let publisher = ReleasePublisher::new(MockApi {
        fail_upload_at: Some(2),
        ..MockApi::default()
    });

    let error = publisher
        .publish(&request(files.clone()), &Credentials::new("token"))
        .expect_err("error");

    match error {
        PublishError::AssetUploadFailed { file, reason } => {
            assert_eq!(file, files[1]);
            assert!(reason.contains("bad gateway"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(publisher.api().uploads(), vec!["one.jar", "two.jar"]);
}

#[test]
fn api_endpoint_override_is_used_for_connect() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["mod.jar"]);
    let publisher = ReleasePublisher::new(MockApi::default());
    let credentials = Credentials::new("token").with_endpoint("https://ghe.example.com/api/v3");

    publisher
        .publish(&request(files), &credentials)
        .expect("publish");

    assert_eq!(
        publisher.api().calls()[0],
        Call::Connect {
            endpoint: "https://ghe.example.com/api/v3".to_string()
        }
    );
}

#[test]
fn authentication_failure_stops_before_repository_lookup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["mod.jar"]);
    let publisher = ReleasePublisher::new(MockApi {
        connect_error: Some(PublishError::AuthenticationFailed("bad token".to_string())),
        ..MockApi::default()
    });

    let error = publisher
        .publish(&request(files), &Credentials::new("token"))
        .expect_err("error");

    assert!(matches!(error, PublishError::AuthenticationFailed(_)));
    assert_eq!(publisher.api().calls().len(), 1);
}

#[test]
fn existing_release_is_not_recreated() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["mod.jar"]);
    let publisher = ReleasePublisher::new(MockApi {
        existing_release: true,
        ..MockApi::default()
    });

    let error = publisher
        .publish(&request(files), &Credentials::new("token"))
        .expect_err("error");

    assert_eq!(
        error,
        PublishError::ReleaseAlreadyExists {
            tag: "1.2.0".to_string()
        }
    );
    assert!(!publisher
        .api()
        .calls()
        .iter()
        .any(|call| matches!(call, Call::CreateRelease(_) | Call::Upload { .. })));
}

#[test]
fn explicit_title_is_used_in_live_and_dry_runs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = write_files(dir.path(), &["mod.jar"]);
    let mut request = request(files);
    request.title = Some("Mod 1.2.0 is out".to_string());
    let publisher = ReleasePublisher::new(MockApi::default());

    let live = publisher
        .publish(&request, &Credentials::new("token"))
        .expect("publish");
    let dry = dry_run_result(&request).expect("dry run");

    assert_eq!(live.title, "Mod 1.2.0 is out");
    assert_eq!(dry.title, "Mod 1.2.0 is out");
    assert_eq!(dry.repository, live.repository);
    assert_eq!(dry.release_id, 0);
}

#[test]
fn dry_run_falls_back_to_default_title() {
    let result = dry_run_result(&request(vec![])).expect("dry run");
    assert_eq!(result.title, DEFAULT_TITLE);
    assert_eq!(result.repository, "octo/mod");
    assert_eq!(result.release_id, 0);
    assert!(result
        .url
        .starts_with("https://github.com/octo/mod/releases/tag/1.2.0?dry-run="));
}
