//! drive_transfer CLI - Hand a user's Drive items to another account or a shared drive.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use drive_transfer::batch::DEFAULT_BATCH_SIZE;
use drive_transfer::{
    Authenticator, BatchConfig, DriveClient, FailurePolicy, Selection, TerminalPrompt,
};

/// Transfer a Google Drive file or folder (recursively) from one user to
/// another, or to a shared drive. Only items owned by the source user are
/// affected; all others are ignored. When moving to a shared drive, the
/// source user must be a member of that drive.
#[derive(Parser)]
#[command(name = "drive_transfer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Service account credentials file (e.g. credentials.json).
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    creds: PathBuf,

    /// ID or URL of the folder to transfer or move.
    #[arg(long)]
    folder: Option<String>,

    /// ID or URL of the file to transfer or move.
    #[arg(long)]
    file: Option<String>,

    /// Text file listing IDs or URLs of files to transfer or move, one per line.
    #[arg(long)]
    files: Option<PathBuf>,

    /// Email address of the person who currently owns the file(s).
    #[arg(long)]
    source: String,

    /// Email address of the person the file(s) ownership should go to.
    #[arg(long)]
    target_owner: Option<String>,

    /// ID of the shared drive to move file(s) to (source user must be a member).
    #[arg(long)]
    target_drive: Option<String>,

    /// ID of the folder within the shared drive to move file(s) to.
    #[arg(long)]
    target_drive_folder: Option<String>,

    /// Number of requests per batch (1-100).
    #[arg(long, env = "DRIVE_TRANSFER_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Keep going after a failed item and report all failures at the end.
    #[arg(long)]
    continue_on_error: bool,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Log every Drive API request.
    #[arg(long)]
    verbose: bool,

    /// Log HTTP internals as well.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        Selection {
            folder: self.folder.clone(),
            file: self.file.clone(),
            files: self.files.clone(),
            target_owner: self.target_owner.clone(),
            target_drive: self.target_drive.clone(),
            target_drive_folder: self.target_drive_folder.clone(),
        }
    }

    fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug,drive_transfer=trace"
        } else if self.verbose {
            "drive_transfer=debug"
        } else {
            "drive_transfer=info"
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .init();

    // Validate everything before touching the network.
    let plan = cli
        .selection()
        .into_plan(&cli.source)
        .context("Invalid arguments")?;

    let policy = if cli.continue_on_error {
        FailurePolicy::ContinueOnError
    } else {
        FailurePolicy::AbortOnFirstError
    };
    let config = BatchConfig::new(cli.batch_size, policy).context("Invalid --batch-size")?;

    let auth = Authenticator::from_file(&cli.creds, &cli.source)
        .with_context(|| format!("Failed to load credentials from {:?}", cli.creds))?;

    let client = DriveClient::new(auth, Duration::from_secs(cli.timeout_secs))
        .context("Failed to build HTTP client")?;

    info!(source = %plan.source, target = ?plan.target, operation = ?plan.operation, "Starting");

    let report = plan
        .execute(&client, config, &mut TerminalPrompt)
        .await
        .context("Transfer failed")?;

    if !report.is_clean() {
        for failure in &report.failures {
            error!(error = %failure, "Item failed");
        }
        anyhow::bail!(
            "{} item(s) failed, {} succeeded",
            report.failures.len(),
            report.succeeded
        );
    }

    println!("Transfer successful!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["drive_transfer", "--creds", "creds.json", "--source", "a@b.c"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--folder", "f1", "--target-owner", "x@y.z"]);
        assert!(!cli.continue_on_error);
        assert_eq!(cli.timeout_secs, 120);
        assert_eq!(cli.default_log_filter(), "drive_transfer=info");
    }

    // Checked on the declared argument so DRIVE_TRANSFER_BATCH_SIZE in the
    // environment cannot change the outcome.
    #[test]
    fn test_batch_size_default_and_env() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id().as_str() == "batch_size")
            .unwrap();

        let defaults: Vec<String> = arg
            .get_default_values()
            .iter()
            .map(|value| value.to_string_lossy().into_owned())
            .collect();
        assert_eq!(defaults, vec![DEFAULT_BATCH_SIZE.to_string()]);
        assert_eq!(
            arg.get_env().and_then(|name| name.to_str()),
            Some("DRIVE_TRANSFER_BATCH_SIZE")
        );
    }

    #[test]
    fn test_batch_size_flag_wins() {
        let cli = parse(&["--batch-size", "25"]);
        assert_eq!(cli.batch_size, 25);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["--verbose"]).default_log_filter(), "drive_transfer=debug");
        assert_eq!(
            parse(&["--verbose", "--debug"]).default_log_filter(),
            "debug,drive_transfer=trace"
        );
    }

    #[test]
    fn test_conflicting_targets_fail_validation() {
        let cli = parse(&["--folder", "f1", "--file", "f2", "--target-owner", "x@y.z"]);
        assert!(cli.selection().into_plan(&cli.source).is_err());
    }
}
