//! Workspace Session - command-line front end for the workspace session manager
//!
//! Run with `workspace-session` or `workspace-session --help` for usage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use workspace_session::{
    APP_NAME, ActiveProjectChanged, Config, DependentView, FolderBrowser, HttpSessionClient,
    ProjectEntry, ProjectPath, SessionStore, SetupPresenter, VERSION, WorkspaceManager,
    session::SwitchOutcome,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Manage the open projects of a workspace session")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the project service URL
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the open projects (default)
    State,

    /// Open a project and make it active
    Open {
        /// Project path on the service's filesystem
        path: String,
    },

    /// Close an open project
    Close {
        /// Project path on the service's filesystem
        path: String,
    },

    /// Switch the active project
    Switch {
        /// Project path on the service's filesystem
        path: String,
    },

    /// List recently opened projects
    Recent,

    /// Browse folders on the service
    Browse {
        /// Folder to list (default: service root)
        path: Option<String>,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

/// Logs reloads; stands in for the panels a full UI would refresh
struct LogView;

#[async_trait]
impl DependentView for LogView {
    fn name(&self) -> &str {
        "log"
    }

    async fn reload(&self, change: &ActiveProjectChanged) -> anyhow::Result<()> {
        info!("Active project is now {}", change.current);
        Ok(())
    }
}

struct ConsoleSetupPresenter;

impl SetupPresenter for ConsoleSetupPresenter {
    fn present_setup(&self, project: &ProjectEntry) {
        println!(
            "Project '{}' has not been initialized yet; run its first-time setup.",
            project.name
        );
    }
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        // Use info level for our crate, warn for dependencies
        EnvFilter::new("info")
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper=warn".parse()?)
    };

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

fn print_session(store: &SessionStore) {
    if store.is_empty() {
        println!("No open projects.");
        return;
    }

    println!("Open projects:");
    for project in store.projects() {
        let marker = if store.is_active(&project.path) { "●" } else { "○" };
        let setup = if project.initialized { "" } else { " (needs setup)" };
        println!("  {} {} [{}]{}", marker, project.name, project.path, setup);
    }
}

fn show_config(config: &Config, init: bool) -> Result<()> {
    if init {
        config.save()?;
        println!(
            "Configuration initialized at {:?}",
            Config::config_file_path()?
        );
    } else {
        println!("Configuration:");
        println!("{}", toml::to_string_pretty(config)?);
        println!("\nConfig file: {:?}", Config::config_file_path()?);
    }
    Ok(())
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    if let Commands::Config { init } = command {
        return show_config(config, init);
    }

    let client = HttpSessionClient::from_config(config)?;
    let manager = WorkspaceManager::new(config, Arc::new(client))
        .with_view(Arc::new(LogView))
        .with_setup_presenter(Arc::new(ConsoleSetupPresenter));

    match command {
        Commands::State => {
            manager.load().await?;
        }

        Commands::Open { path } => {
            manager.load().await?;
            let outcome = manager.open_project(ProjectPath::new(path)).await?;
            println!("Opened '{}'", outcome.project.name);
        }

        Commands::Close { path } => {
            manager.load().await?;
            let outcome = manager.close_project(ProjectPath::new(path)).await?;
            if let Some(active) = outcome.active_project {
                println!("Active project: {}", active);
            }
        }

        Commands::Switch { path } => {
            manager.load().await?;
            match manager.switch_to(ProjectPath::new(path)).await? {
                SwitchOutcome::AlreadyActive => println!("Already active."),
                SwitchOutcome::Switched { .. } => println!("Switched."),
            }
        }

        Commands::Recent => {
            let recent = manager.list_recent().await?;
            if recent.is_empty() {
                println!("No recent projects.");
            }
            for path in recent {
                println!("  {}", path);
            }
            return Ok(());
        }

        Commands::Browse { path } => {
            let mut browser = FolderBrowser::new(manager.service());
            let cursor = match path {
                Some(path) => {
                    browser.start().await?;
                    browser.navigate(&path).await?
                }
                None => browser.start().await?,
            };

            let trail: Vec<_> = cursor.breadcrumbs().into_iter().map(|c| c.label).collect();
            println!("{}", trail.join(" › "));
            for entry in &cursor.entries {
                let marker = if entry.is_project { "*" } else { " " };
                println!("  {} {}", marker, entry.name);
            }
            return Ok(());
        }

        Commands::Config { .. } => return Ok(()),
    }

    print_session(&*manager.state().await);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    });

    if let Some(url) = cli.service_url {
        config.service_url = url;
    }

    setup_logging(cli.debug || config.debug, config.log_file.as_deref())?;

    run(cli.command.unwrap_or(Commands::State), &config).await
}
