//! Checkin server wiring.
//!
//! Turns a [`ServerConfig`] into concrete backends for [`checkin_api`] and
//! wraps the API router in the HTTP layers a deployment needs: tracing, CORS,
//! request timeouts, and the static `/qr` directory when artifacts are
//! published locally.

pub mod config;

use std::time::Duration;

use anyhow::Context as _;
use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use checkin_api::Backend;
use checkin_cache::{Cache, MemoryCache, RedisCache};
use checkin_media::{
  BrevoMailer, BrevoSender, CloudinaryCredentials, CloudinaryPublisher, LocalPublisher, LogMailer,
  Mailer, PngQrRenderer, Publisher,
};
use checkin_store_sqlite::SqliteStore;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  services::ServeDir,
  timeout::TimeoutLayer,
  trace::TraceLayer,
};

pub use config::{ServerConfig, StorageKind};

// ─── Backends ────────────────────────────────────────────────────────────────

/// The backends selected by [`ServerConfig`].
pub struct ServerBackend;

impl Backend for ServerBackend {
  type Store = SqliteStore;
  type Cache = Cache;
  type Renderer = PngQrRenderer;
  type Publisher = Publisher;
  type Notifier = Mailer;
}

/// Redis when a URL is configured, otherwise the in-process cache.
pub async fn connect_cache(cfg: &ServerConfig) -> anyhow::Result<Cache> {
  match &cfg.cache.redis_url {
    Some(url) => {
      let cache = RedisCache::connect(url, cfg.cache_timeout())
        .await
        .context("failed to connect to redis")?;
      tracing::info!("using redis token cache");
      Ok(Cache::Redis(cache))
    }
    None => {
      tracing::warn!("no redis_url configured; tokens live in process memory");
      Ok(Cache::Memory(MemoryCache::new()))
    }
  }
}

pub fn publisher(cfg: &ServerConfig) -> Publisher {
  let storage = &cfg.storage;
  match storage.kind {
    StorageKind::Local => Publisher::Local(LocalPublisher::new(
      storage.public_dir.clone(),
      storage.public_base_url.trim_end_matches('/'),
    )),
    StorageKind::Cloudinary => Publisher::Cloudinary(CloudinaryPublisher::new(CloudinaryCredentials {
      cloud_name: storage.cloud_name.clone(),
      api_key:    storage.api_key.clone(),
      api_secret: storage.api_secret.clone(),
    })),
  }
}

pub fn mailer(cfg: &ServerConfig) -> Mailer {
  match &cfg.mail.brevo_api_key {
    Some(key) => Mailer::Brevo(BrevoMailer::new(key.clone(), BrevoSender {
      name:  cfg.mail.sender_name.clone(),
      email: cfg.mail.sender_email.clone(),
    })),
    None => {
      tracing::warn!("no brevo_api_key configured; reset links are only logged");
      Mailer::Log(LogMailer)
    }
  }
}

// ─── HTTP layers ─────────────────────────────────────────────────────────────

/// Allowed origins are `cors_origins`, or just `front_url` when that is empty.
fn cors_layer(cfg: &ServerConfig) -> anyhow::Result<CorsLayer> {
  let origins = if cfg.cors_origins.is_empty() {
    vec![cfg.front_url.trim_end_matches('/').to_owned()]
  } else {
    cfg.cors_origins.clone()
  };
  let origins = origins
    .iter()
    .map(|o| {
      o.parse::<HeaderValue>()
        .with_context(|| format!("invalid cors origin {o:?}"))
    })
    .collect::<anyhow::Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
      .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
      .max_age(Duration::from_secs(60 * 60)),
  )
}

/// Mount static artifacts and wrap `router` in the server's layers.
pub fn with_layers(router: Router, cfg: &ServerConfig) -> anyhow::Result<Router> {
  let router = match cfg.storage.kind {
    StorageKind::Local => router.nest_service("/qr", ServeDir::new(&cfg.storage.public_dir)),
    StorageKind::Cloudinary => router,
  };

  Ok(
    router
      .layer(TimeoutLayer::new(cfg.request_timeout()))
      .layer(cors_layer(cfg)?)
      .layer(TraceLayer::new_for_http()),
  )
}

// ─── Shutdown ────────────────────────────────────────────────────────────────

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for sigterm");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  tracing::info!("shutdown signal received");
}
