// crates/edge/src/cli.rs

use crate::{router, Error as EdgeError};
use anyhow::Context;
use axum::Router;
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use domain::{content::Collection, setting::Settings};
use serve::ContentStore;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tokio::net::TcpListener;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, EdgeError>;

pub const SETTINGS_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "JAMHOST";

/// jamhost CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
        Commands::Resolve(resolve) => do_resolve(resolve),
    };

    result.map_or_else(
        |e| {
            error!("jamhost failed: {:#}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> anyhow::Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.build_router()?;
    info!(
        "Routes registered in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let process = process.bind().await?;
    process.serve().await.context("server stopped with an error")?;

    info!("jamhost shut down");
    Ok(())
}

/// Print one resolved document as JSON.
#[tracing::instrument(skip_all)]
fn do_resolve(cmd: ResolveCmd) -> anyhow::Result<()> {
    let settings = load_settings(&cmd.dir)?;
    let store = ContentStore::from_settings(&settings.content);
    let locale = cmd
        .locale
        .unwrap_or_else(|| settings.content.default_locale.to_string());

    let doc = store
        .resolve(cmd.collection, &cmd.slug, &locale)
        .with_context(|| format!("resolving {}/{} ({locale})", cmd.collection, cmd.slug))?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "jamhost", version, about = "jamhost site backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site API from the specified directory
    Start(StartCmd),

    /// Resolve a single document and print it as JSON
    Resolve(ResolveCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Site directory holding settings.toml (or set JAMHOST_DIR)
    #[arg(
        value_name = "DIR",
        env = "JAMHOST_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ResolveCmd {
    #[arg(value_name = "DIR", value_hint = ValueHint::DirPath, value_parser = dir_must_exist)]
    pub dir: PathBuf,

    /// `blog` or `legal`
    pub collection: Collection,

    pub slug: String,

    /// Requested locale; defaults to the configured default locale
    #[arg(long)]
    pub locale: Option<String>,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

/// Read `<dir>/settings.toml`, overlay `JAMHOST__SECTION__KEY` variables,
/// and root relative content directories at `dir`.
#[tracing::instrument(skip_all)]
pub fn load_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return Err(EdgeError::Config(format!(
            "{SETTINGS_FILE} not found at {}",
            path.display()
        )));
    }

    let settings: Settings = Config::builder()
        .add_source(File::from(path.clone()).format(FileFormat::Toml))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    if settings.content.per_page == 0 {
        return Err(EdgeError::Config(format!(
            "content.per_page must be at least 1 in {}",
            path.display()
        )));
    }

    Ok(settings.rooted_at(dir))
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    settings: Settings,
}

struct RouterCreated {
    settings: Settings,
    router: Router,
}

struct Bound {
    router: Router,
    listener: TcpListener,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for RouterCreated {}
impl ProcessState for Bound {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: StartCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = load_settings(&command.dir)?;
        Ok(StartProcess {
            state: SettingsLoaded { settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn build_router(self) -> Result<StartProcess<RouterCreated>> {
        let router = router::build_app(&self.state.settings)?;
        Ok(StartProcess {
            state: RouterCreated {
                settings: self.state.settings,
                router,
            },
        })
    }
}

impl StartProcess<RouterCreated> {
    #[tracing::instrument(skip_all)]
    async fn bind(self) -> Result<StartProcess<Bound>> {
        let server = &self.state.settings.server;
        let addr = SocketAddr::new(server.ip, server.port);
        let listener = TcpListener::bind(addr).await?;
        info!("jamhost listening on http://{}", listener.local_addr()?);
        Ok(StartProcess {
            state: Bound {
                router: self.state.router,
                listener,
            },
        })
    }
}

impl StartProcess<Bound> {
    /// Runs until Ctrl-C.
    async fn serve(self) -> Result<()> {
        axum::serve(self.state.listener, self.state.router)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("failed to listen for shutdown signal: {e}");
                }
                info!("Received shutdown signal");
            })
            .await?;
        Ok(())
    }
}
