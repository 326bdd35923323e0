use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ghrelease_cli::commands;
use ghrelease_core::{GithubSettings, ReleaseType};

#[derive(Parser)]
#[command(name = "ghrelease", version, about = "Publish release files to GitHub")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a GitHub release and upload its files.
    Publish {
        #[command(flatten)]
        release: ReleaseArgs,
        /// Print a synthetic result instead of talking to GitHub.
        #[arg(long)]
        dry_run: bool,
        /// Write the result as JSON to this path.
        #[arg(long)]
        result_file: Option<PathBuf>,
        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Check configuration and files without any network call.
    Validate {
        #[command(flatten)]
        release: ReleaseArgs,
    },
}

#[derive(Args)]
struct ReleaseArgs {
    /// Directory containing ghrelease.yaml (searched upward) and Cargo.toml.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
    /// Repository slug (owner/repo).
    #[arg(long)]
    repository: Option<String>,
    /// Tag to create (default: project version).
    #[arg(long)]
    tag: Option<String>,
    /// Branch or commit SHA the tag is created from.
    #[arg(long)]
    commitish: Option<String>,
    /// API endpoint for GitHub Enterprise, e.g. https://ghe.example.com/api/v3.
    #[arg(long)]
    api_endpoint: Option<String>,
    /// Version used for the default tag and release name.
    #[arg(long)]
    release_version: Option<String>,
    /// Release name shown on GitHub.
    #[arg(long)]
    display_name: Option<String>,
    /// Title reported in the result.
    #[arg(long)]
    title: Option<String>,
    /// Release body.
    #[arg(long, conflicts_with = "changelog_file")]
    changelog: Option<String>,
    /// File holding the release body.
    #[arg(long)]
    changelog_file: Option<PathBuf>,
    /// stable | beta | alpha. Non-stable releases are prereleases.
    #[arg(long = "type")]
    release_type: Option<ReleaseType>,
    /// Primary file, uploaded last.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Additional files, uploaded in the given order.
    #[arg(long = "additional-file")]
    additional_files: Vec<PathBuf>,
}

impl ReleaseArgs {
    fn into_parts(self) -> Result<(PathBuf, GithubSettings), String> {
        let cwd = std::env::current_dir()
            .map_err(|err| format!("failed to read current directory: {}", err))?;
        let overrides = GithubSettings {
            repository: self.repository,
            commitish: self.commitish,
            tag_name: self.tag,
            api_endpoint: self.api_endpoint,
            version: self.release_version,
            display_name: self.display_name,
            announcement_title: self.title,
            changelog: self.changelog,
            changelog_file: self.changelog_file.map(|path| cwd.join(path)),
            release_type: self.release_type,
            file: self.file.map(|path| cwd.join(path)),
            additional_files: self
                .additional_files
                .into_iter()
                .map(|path| cwd.join(path))
                .collect(),
        };
        Ok((self.project_dir, overrides))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(message) = run_cli(cli.command) {
        exit_with_error(&message);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_cli(command: Command) -> Result<(), String> {
    match command {
        Command::Publish {
            release,
            dry_run,
            result_file,
            timeout_secs,
        } => {
            let (project_dir, overrides) = release.into_parts()?;
            let result = commands::publish::run(commands::publish::PublishArgs {
                project_dir,
                overrides,
                github_token: std::env::var("GITHUB_TOKEN").ok(),
                dry_run,
                timeout: timeout_secs.map(Duration::from_secs),
                result_file,
            })?;
            println!("repository={}", result.repository);
            println!("release_id={}", result.release_id);
            println!("url={}", result.url);
            println!("title={}", result.title);
            Ok(())
        }
        Command::Validate { release } => {
            let (project_dir, overrides) = release.into_parts()?;
            let outcome = commands::validate::run(commands::validate::ValidateArgs {
                project_dir,
                overrides,
            })?;
            println!("repository={}", outcome.repository);
            println!("tag={}", outcome.tag_name);
            for file in outcome.files {
                println!("file={}", file.display());
            }
            Ok(())
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
