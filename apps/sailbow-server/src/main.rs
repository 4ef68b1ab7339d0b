use anyhow::{anyhow, Context, Result};
use boats::{config::BoatsConfig, Boats};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use url::Url;

mod ingress;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Sailbow Server - trip planning backend
#[derive(Parser)]
#[command(name = "sailbow-server")]
#[command(about = "Sailbow Server - trips, crew and planning modules")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Sailbow Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, cli.mock).await,
        Commands::Check => check_config(config),
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_database(config: &AppConfig, mock: bool) -> Result<DatabaseConnection> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("database section is required to run the server"))?;

    let mut dsn = if mock {
        "sqlite::memory:".to_string()
    } else {
        detect_from_dsn(&db_config)?;
        db_config.url.trim().to_owned()
    };
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(db_config.acquire_timeout)
        .sqlx_logging(false);
    // One connection keeps an in-memory SQLite database alive and shared.
    if dsn == "sqlite::memory:" {
        opts.max_connections(1).min_connections(1);
    } else if let Some(max) = db_config.max_conns {
        opts.max_connections(max);
    }

    tracing::info!("Connecting to database: {}", dsn);
    Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))
}

async fn run_server(config: AppConfig, mock: bool) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db = connect_database(&config, mock).await?;
    Boats::migrate(&db).await?;

    let boats_config: BoatsConfig = config.module_config(Boats::NAME)?;
    let boats = Boats::init(&boats_config, db)?;

    let router = ingress::build_router(boats.register_rest(axum::Router::new()), &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Sailbow Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        detect_from_dsn(db)?;
    }
    let _: BoatsConfig = config.module_config(Boats::NAME)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_is_kept() {
        let out = absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/tmp"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_sqlite_path_is_joined_to_home() {
        let home = tempfile::tempdir().unwrap();
        let out = absolutize_sqlite_dsn("sqlite://db/trips.db?mode=rwc", home.path(), true).unwrap();
        assert!(out.starts_with("sqlite://"));
        assert!(out.ends_with("db/trips.db?mode=rwc"));
        assert!(home.path().join("db").is_dir());
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let cfg = DatabaseConfig {
            url: "mysql://localhost/sailbow".into(),
            max_conns: None,
            acquire_timeout: std::time::Duration::from_secs(5),
        };
        assert!(detect_from_dsn(&cfg).is_err());
    }
}
