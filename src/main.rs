//! drive_fetch CLI - Download and export files from Google Drive.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drive_fetch::batch::{write_metadata_index, BatchSummary, DownloadStatus};
use drive_fetch::config::{default_accounts_dir, DataDir, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR};
use drive_fetch::models::format_size;
use drive_fetch::selection::{parse_selection, Selection};
use drive_fetch::url_parser::extract_folder_id;
use drive_fetch::{
    download_all, download_ids, AccountManager, Authenticator, DriveClient, ExportPreset,
};

/// CLI tool for pulling Google Drive files onto local disk.
#[derive(Parser)]
#[command(name = "drive_fetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding credentials.json and token.json.
    #[arg(long, env = "DRIVE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Use a named account from the accounts directory instead of --data-dir.
    #[arg(long, env = "DRIVE_ACCOUNT")]
    account: Option<String>,

    /// Accounts directory (defaults to ~/.drive-accounts).
    #[arg(long, env = "DRIVE_ACCOUNTS_DIR")]
    accounts_dir: Option<PathBuf>,

    /// Directory downloaded files are written to.
    #[arg(long, short = 'o', env = "DRIVE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Bearer token to use instead of the OAuth flow.
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files and interactively pick which to download.
    Fetch {
        /// Folder URL or ID (defaults to the Drive root).
        #[arg(long)]
        folder: Option<String>,

        /// Maximum number of files to list.
        #[arg(long, default_value_t = 100)]
        max_results: usize,

        /// Export format preset for Docs, Sheets and Slides.
        #[arg(long, short = 'f', value_enum, default_value_t = ExportPreset::TextOnly)]
        format: ExportPreset,

        /// Do not write _file_metadata.md.
        #[arg(long)]
        no_index: bool,
    },

    /// Download files by URL or ID.
    Download {
        /// Drive, Docs, Sheets or Slides URLs, or bare file IDs.
        #[arg(required = true, value_name = "URL_OR_ID")]
        files: Vec<String>,

        /// Export format preset for Docs, Sheets and Slides.
        #[arg(long, short = 'f', value_enum, default_value_t = ExportPreset::TextOnly)]
        format: ExportPreset,

        /// Do not write _file_metadata.md.
        #[arg(long)]
        no_index: bool,
    },

    /// List files in a folder.
    List {
        /// Folder URL or ID (defaults to the Drive root).
        #[arg(long)]
        folder: Option<String>,

        /// Maximum number of files to list.
        #[arg(long, default_value_t = 100)]
        max_results: usize,
    },

    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// List available accounts.
    List,

    /// Create an account from an OAuth client credentials file.
    Add {
        /// Account name.
        name: String,

        /// Path to credentials.json downloaded from the Google Cloud console.
        credentials: PathBuf,
    },

    /// Set up a project directory to use an account.
    Setup {
        /// Account name.
        name: String,

        /// Project directory.
        #[arg(default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let accounts = AccountManager::new(cli.accounts_dir.clone().unwrap_or_else(default_accounts_dir));

    match &cli.command {
        Commands::Accounts { command } => run_accounts(&accounts, command),

        Commands::List {
            folder,
            max_results,
        } => {
            let client = connect(&cli, &accounts).await?;
            let folder_id = folder.as_deref().map(extract_folder_id);

            let files = client
                .list_files(folder_id.as_deref(), *max_results)
                .await
                .context("Failed to list files")?;

            if files.is_empty() {
                println!("No files found.");
            } else {
                println!(
                    "{:<44}\t{:>10}\t{:<12}\t{:<24}\t{}",
                    "ID", "SIZE", "TYPE", "MODIFIED", "NAME"
                );
                println!("{}", "-".repeat(110));
                for file in files {
                    println!("{}", file);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Fetch {
            folder,
            max_results,
            format,
            no_index,
        } => {
            let client = connect(&cli, &accounts).await?;
            let folder_id = folder.as_deref().map(extract_folder_id);

            println!("Fetching file list from Google Drive...\n");
            let files = client
                .list_files(folder_id.as_deref(), *max_results)
                .await
                .context("Failed to list files")?;

            if files.is_empty() {
                println!("No files found in your Google Drive.");
                return Ok(ExitCode::SUCCESS);
            }

            println!("Found {} files:\n", files.len());
            for (idx, file) in files.iter().enumerate() {
                println!("{:3}. {:<40} ({})", idx + 1, file.name, file.short_type());
            }

            println!("\n{}", "=".repeat(60));
            println!("Select files to download:");
            println!("  - Enter numbers separated by commas (e.g., 1,2,5)");
            println!("  - Enter 'all' to download all files");
            println!("  - Enter 'q' to quit");
            println!("{}", "=".repeat(60));
            print!("\nYour selection: ");
            io::stdout().flush()?;

            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;

            let selected: Vec<String> = match parse_selection(&line, files.len()) {
                Ok(Selection::Quit) => {
                    println!("Exiting...");
                    return Ok(ExitCode::SUCCESS);
                }
                Ok(Selection::All) => files.iter().map(|f| f.id.clone()).collect(),
                Ok(Selection::Indices(indices)) => {
                    indices.into_iter().map(|i| files[i].id.clone()).collect()
                }
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };

            if selected.is_empty() {
                println!("No files selected.");
                return Ok(ExitCode::SUCCESS);
            }

            print_header(selected.len(), &cli.output_dir, *format);
            let summary = download_ids(&client, &selected, &cli.output_dir, *format)
                .await
                .context("Download aborted")?;
            report(&summary, &cli.output_dir, *no_index)
        }

        Commands::Download {
            files,
            format,
            no_index,
        } => {
            let client = connect(&cli, &accounts).await?;

            print_header(files.len(), &cli.output_dir, *format);
            let summary = download_all(&client, files.as_slice(), &cli.output_dir, *format)
                .await
                .context("Download aborted")?;
            report(&summary, &cli.output_dir, *no_index)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("drive_fetch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build an authenticated client; authentication problems end the invocation here.
async fn connect(cli: &Cli, accounts: &AccountManager) -> Result<DriveClient> {
    let auth = match &cli.access_token {
        Some(token) => Authenticator::from_access_token(token.clone()),
        None => {
            let data_dir = DataDir::resolve(&cli.data_dir, cli.account.as_deref(), accounts)?;
            Authenticator::from_files(data_dir.credentials_path(), data_dir.token_path())?
        }
    };

    auth.get_access_token()
        .await
        .context("Authentication failed")?;

    Ok(DriveClient::new(auth))
}

fn run_accounts(accounts: &AccountManager, command: &AccountCommands) -> Result<ExitCode> {
    match command {
        AccountCommands::List => {
            let names = accounts.list_accounts()?;
            if names.is_empty() {
                println!("No accounts found in {}", accounts.accounts_dir().display());
            } else {
                println!("Available accounts:");
                for name in names {
                    println!("  - {}", name);
                }
            }
        }

        AccountCommands::Add { name, credentials } => {
            accounts
                .create_account(name, credentials)
                .with_context(|| format!("Failed to create account '{}'", name))?;
            println!("Account '{}' created successfully", name);
        }

        AccountCommands::Setup { name, project_dir } => {
            let data_dir = accounts
                .setup_project(name, project_dir)
                .with_context(|| format!("Failed to set up {:?}", project_dir))?;
            println!("Project set up with account '{}' in {:?}", name, data_dir);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_header(count: usize, output_dir: &Path, format: ExportPreset) {
    println!("Export format: {}", format.description());
    println!("Downloading {} file(s) to {}/\n", count, output_dir.display());
}

fn report(summary: &BatchSummary, output_dir: &Path, no_index: bool) -> Result<ExitCode> {
    for (idx, result) in summary.results.iter().enumerate() {
        print!("[{}/{}] {}... ", idx + 1, summary.total(), result.name);
        match &result.status {
            DownloadStatus::Success {
                path,
                bytes,
                metadata,
            } => {
                println!("OK ({})", format_size(*bytes));
                println!(
                    "  Last modified: {}",
                    metadata.modified_time.as_deref().unwrap_or("Unknown")
                );
                println!("  File ID: {}", result.file_id);
                println!("  Saved to: {:?}", path);
            }
            DownloadStatus::Failure { reason } => {
                println!("FAILED");
                eprintln!("  Error: {}", reason);
            }
        }
    }

    let downloaded = summary.downloaded();
    if !no_index && !downloaded.is_empty() {
        let index = write_metadata_index(output_dir, &downloaded)
            .context("Failed to write metadata index")?;
        println!("\nMetadata saved to: {:?}", index);
    }

    let absolute = std::path::absolute(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    println!("\n{}", "=".repeat(60));
    println!(
        "Successfully downloaded {}/{} files",
        summary.success_count(),
        summary.total()
    );
    println!("Files saved to: {}", absolute.display());
    println!("{}", "=".repeat(60));

    if summary.failure_count() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
