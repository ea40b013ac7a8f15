//! Checkin server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CHECKIN_*` environment variables, opens the SQLite store, connects the
//! token cache, and serves the JSON API over HTTP.
//!
//! Nested keys use a double underscore, e.g. `CHECKIN_CACHE__REDIS_URL`.
//!
//! # Granting admin rights
//!
//! ```
//! cargo run -p checkin-server --bin server -- --promote-admin ana@example.com
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use checkin_api::{ApiSettings, AppState};
use checkin_core::{store::AttendanceStore, volunteer::normalize_email};
use checkin_media::PngQrRenderer;
use checkin_server::{ServerBackend, ServerConfig, connect_cache, mailer, publisher, shutdown_signal};
use checkin_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Checkin attendance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Grant admin rights to the volunteer with this email and exit.
  #[arg(long, value_name = "EMAIL")]
  promote_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CHECKIN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_origins"),
    )
    .build()
    .context("failed to read config file")?;

  let cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let db_path = expand_tilde(&cfg.database_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  // Helper mode: promote a volunteer and exit.
  if let Some(email) = cli.promote_admin {
    let email = normalize_email(&email);
    if !store.set_admin(&email, true).await? {
      bail!("no volunteer registered with {email}");
    }
    tracing::info!(%email, "volunteer promoted to admin");
    return Ok(());
  }

  cfg.validate()?;
  let rules = cfg.punctuality_rules()?;
  let cache = connect_cache(&cfg).await?;

  let state = AppState::<ServerBackend>::new(
    Arc::new(store),
    Arc::new(cache),
    PngQrRenderer::default(),
    publisher(&cfg),
    mailer(&cfg),
    ApiSettings {
      jwt_secret:  cfg.jwt_secret.clone(),
      front_url:   cfg.front_url.clone(),
      window:      cfg.window(),
      scratch_dir: std::env::temp_dir(),
      rules,
    },
  );

  let app = checkin_server::with_layers(checkin_api::router(state), &cfg)?;
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
