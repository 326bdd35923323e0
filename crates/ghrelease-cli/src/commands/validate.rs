use std::path::PathBuf;

use ghrelease_core::GithubSettings;

use crate::commands::request::prepare;

pub struct ValidateArgs {
    pub project_dir: PathBuf,
    pub overrides: GithubSettings,
}

pub struct ValidateOutcome {
    pub repository: String,
    pub tag_name: String,
    pub files: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<ValidateOutcome, String> {
    let prepared = prepare(&args.project_dir, args.overrides)?;
    ghrelease_publish::validate(&prepared.request).map_err(|err| err.to_string())?;
    Ok(ValidateOutcome {
        repository: prepared.request.repository,
        tag_name: prepared.request.tag_name,
        files: prepared.request.files,
    })
}
