use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use satchel::adapter::{AdapterRegistry, HostedAdapter, HostedConfig, StorageAdapter};
use satchel::codec;
use satchel::reconcile::{self, ReplaceReport};
use satchel::repo::{LocalRepo, Repository};

#[derive(Parser)]
#[command(name = "satchel")]
#[command(about = "Workspace backup and restore", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace (.satchel)
    Init {
        /// Re-initialize if .satchel already exists
        #[arg(long)]
        force: bool,
        /// Path to initialize (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Export the workspace to a snapshot file
    Export {
        /// Output file (defaults to satchel-export.json)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Workspace path (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Import a snapshot file, replacing the workspace contents
    Import {
        file: PathBuf,
        /// Workspace path (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Upload the workspace snapshot to a hosted backend
    Push {
        #[arg(long)]
        url: String,
        #[arg(long)]
        token: String,
        /// Workspace path (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Download a snapshot from a hosted backend and import it
    Pull {
        remote_id: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        token: String,
        /// Workspace path (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// List available storage adapters and their capabilities
    Adapters {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force, path } => {
            let root = workspace_root(path)?;
            LocalRepo::init(&root, force)?;
            println!("Initialized workspace at {}", root.display());
        }

        Commands::Export { out, path } => {
            let root = workspace_root(path)?;
            let repo = LocalRepo::open(&root)?;
            let snapshot = codec::encode(&repo.folders()?, &repo.files()?);

            let registry = AdapterRegistry::with_defaults();
            let adapter = registry.current();
            let payload = adapter.encode_payload(&snapshot)?;

            let out = out.unwrap_or_else(|| PathBuf::from("satchel-export.json"));
            match adapter {
                StorageAdapter::Local(local) => local.save(&out, &payload)?,
                other => anyhow::bail!("adapter `{}` cannot write local files", other.id()),
            }
            println!(
                "Exported {} folders, {} files to {}",
                snapshot.folders.len(),
                snapshot.files.len(),
                out.display()
            );
        }

        Commands::Import { file, path } => {
            let root = workspace_root(path)?;
            let mut repo = LocalRepo::open(&root)?;

            let registry = AdapterRegistry::with_defaults();
            let adapter = registry.current();
            let payload = match adapter {
                StorageAdapter::Local(local) => local.load(&file)?,
                other => anyhow::bail!("adapter `{}` cannot read local files", other.id()),
            };
            let snapshot = adapter.decode_payload(&payload)?;

            let report = reconcile::replace(&mut repo, &snapshot)
                .with_context(|| format!("import {}", file.display()))?;
            print_report(&report);
        }

        Commands::Push { url, token, path } => {
            let root = workspace_root(path)?;
            let repo = LocalRepo::open(&root)?;
            let snapshot = codec::encode(&repo.folders()?, &repo.files()?);

            let mut registry = AdapterRegistry::with_defaults();
            registry.register(StorageAdapter::Hosted(HostedAdapter::new(HostedConfig {
                base_url: url,
                token: None,
            })?));
            registry.select(HostedAdapter::ID)?;
            registry.current_mut().authenticate(&token)?;

            let adapter = registry.current();
            let payload = adapter.encode_payload(&snapshot)?;
            let receipt = adapter.upload(&payload).context("push snapshot")?;
            match receipt.remote_url {
                Some(remote_url) => println!("Pushed as {} ({})", receipt.remote_id, remote_url),
                None => println!("Pushed as {}", receipt.remote_id),
            }
        }

        Commands::Pull {
            remote_id,
            url,
            token,
            path,
        } => {
            let root = workspace_root(path)?;
            let mut repo = LocalRepo::open(&root)?;

            let mut registry = AdapterRegistry::with_defaults();
            registry.register(StorageAdapter::Hosted(HostedAdapter::new(HostedConfig {
                base_url: url,
                token: None,
            })?));
            registry.select(HostedAdapter::ID)?;
            registry.current_mut().authenticate(&token)?;

            let adapter = registry.current();
            let payload = adapter
                .download(&remote_id)
                .with_context(|| format!("pull snapshot {remote_id}"))?;
            let snapshot = adapter.decode_payload(&payload)?;

            let report = reconcile::replace(&mut repo, &snapshot)
                .with_context(|| format!("import snapshot {remote_id}"))?;
            print_report(&report);
        }

        Commands::Adapters { json } => {
            let mut registry = AdapterRegistry::with_defaults();
            registry.register(StorageAdapter::Hosted(HostedAdapter::new(HostedConfig {
                base_url: String::new(),
                token: None,
            })?));

            if json {
                let rows: Vec<serde_json::Value> = registry
                    .list()
                    .iter()
                    .map(|a| {
                        let caps = a.capabilities();
                        serde_json::json!({
                            "id": a.id(),
                            "label": a.label(),
                            "upload": caps.upload,
                            "download": caps.download,
                            "authenticate": caps.authenticate,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for a in registry.list() {
                    let caps = a.capabilities();
                    println!(
                        "{:<8} {:<16} upload={} download={} authenticate={}",
                        a.id(),
                        a.label(),
                        caps.upload,
                        caps.download,
                        caps.authenticate
                    );
                }
            }
        }
    }

    Ok(())
}

fn workspace_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => std::env::current_dir().context("resolve current directory"),
    }
}

fn print_report(report: &ReplaceReport) {
    println!(
        "Imported {} folders, {} files",
        report.folders_created, report.files_created
    );
    if !report.wipe_failures.is_empty() {
        eprintln!(
            "Warning: {} items could not be deleted during the wipe:",
            report.wipe_failures.len()
        );
        for failure in &report.wipe_failures {
            eprintln!("  {:?}: {}", failure.item, failure.error);
        }
    }
}
