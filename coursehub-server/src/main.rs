//! coursehub-server - HTTP backend for the CourseHub learning platform
//!
//! `coursehub-server [serve]` runs the API; `coursehub-server create-admin`
//! bootstraps or promotes an administrator account.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursehub_common::config::{ConfigOverrides, ServiceConfig};
use coursehub_common::db::{self, sessions, users};
use coursehub_common::Role;
use coursehub_server::api::accounts::{hash_password, validate_password, validate_username};
use coursehub_server::{build_router, build_router_with_cors, AppState};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "coursehub-server")]
#[command(about = "HTTP backend for the CourseHub learning platform")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(long, global = true, env = "COURSEHUB_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "COURSEHUB_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5800
    #[arg(long, global = true, env = "COURSEHUB_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Lifetime of issued session tokens
    #[arg(long, global = true, env = "COURSEHUB_SESSION_TTL_HOURS")]
    session_ttl_hours: Option<i64>,

    /// Allow cross-origin requests from any origin
    #[arg(long, global = true, env = "COURSEHUB_CORS_PERMISSIVE")]
    cors_permissive: Option<bool>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create an admin account, or promote and reset an existing one
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, env = "COURSEHUB_ADMIN_PASSWORD")]
        password: String,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            bind_addr: self.bind_addr.clone(),
            database_path: self.database.clone(),
            session_ttl_hours: self.session_ttl_hours,
            cors_permissive: self.cors_permissive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "coursehub_server=info,coursehub_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting CourseHub server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ServiceConfig::resolve(args.overrides()).context("Failed to load configuration")?;
    info!("Database path: {}", config.database_path.display());

    let pool = db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, config).await,
        Command::CreateAdmin {
            username,
            email,
            password,
        } => create_admin(&pool, &username, &email, password).await,
    }
}

async fn serve(pool: SqlitePool, config: ServiceConfig) -> Result<()> {
    let purged = sessions::purge_expired(&pool)
        .await
        .context("Failed to purge expired sessions")?;
    if purged > 0 {
        info!("Purged {} expired sessions", purged);
    }

    let state = AppState::new(pool, config.session_ttl_hours);
    let app = if config.cors_permissive {
        info!("CORS: allowing any origin");
        build_router_with_cors(state)
    } else {
        build_router(state)
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("coursehub-server listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create `username` as admin, or promote the existing account and reset its password
async fn create_admin(pool: &SqlitePool, username: &str, email: &str, password: String) -> Result<()> {
    validate_username(username)?;
    validate_password(&password)?;
    let password_hash = hash_password(password).await?;

    match users::get_user_by_username(pool, username).await? {
        Some(existing) => {
            users::set_password_hash(pool, existing.id, &password_hash).await?;
            users::set_role(pool, existing.id, Role::Admin).await?;
            info!(user_id = existing.id, "Promoted existing user '{}' to admin", username);
        }
        None => {
            let user = users::create_user(pool, username, email, &password_hash, Role::Admin).await?;
            info!(user_id = user.id, "Created admin user '{}'", username);
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    #[serial]
    fn test_no_subcommand_means_serve() {
        let args = Args::try_parse_from(["coursehub-server"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    #[serial]
    fn test_env_feeds_overrides() {
        std::env::set_var("COURSEHUB_BIND_ADDR", "0.0.0.0:8080");
        std::env::set_var("COURSEHUB_SESSION_TTL_HOURS", "6");
        let args = Args::try_parse_from(["coursehub-server"]).unwrap();
        std::env::remove_var("COURSEHUB_BIND_ADDR");
        std::env::remove_var("COURSEHUB_SESSION_TTL_HOURS");

        let overrides = args.overrides();
        assert_eq!(overrides.bind_addr.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(overrides.session_ttl_hours, Some(6));
    }

    #[test]
    #[serial]
    fn test_flag_beats_env() {
        std::env::set_var("COURSEHUB_BIND_ADDR", "0.0.0.0:8080");
        let args =
            Args::try_parse_from(["coursehub-server", "--bind-addr", "127.0.0.1:9999"]).unwrap();
        std::env::remove_var("COURSEHUB_BIND_ADDR");

        assert_eq!(args.bind_addr.as_deref(), Some("127.0.0.1:9999"));
    }

    #[test]
    #[serial]
    fn test_create_admin_arguments() {
        let args = Args::try_parse_from([
            "coursehub-server",
            "create-admin",
            "--username",
            "root",
            "--password",
            "correct horse",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Some(Command::CreateAdmin {
                username: "root".to_string(),
                email: String::new(),
                password: "correct horse".to_string(),
            })
        );
    }
}
