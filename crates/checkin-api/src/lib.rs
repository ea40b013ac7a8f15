//! JSON REST API for Checkin.
//!
//! Exposes an axum [`Router`] over any set of backends implementing the
//! `checkin-core` traits. TLS, CORS and static files are the caller's
//! concern.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = checkin_api::router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod account;
pub mod auth;
pub mod checkins;
pub mod dashboard;
pub mod error;
pub mod password;
pub mod profile;
pub mod qr;
pub mod session;
pub mod volunteers;


use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use checkin_core::{
  admission::Admission,
  cache::TokenCache,
  issuer::{IssuerConfig, TokenIssuer},
  media::{ArtifactPublisher, Notifier, QrRenderer},
  punctuality::PunctualityRules,
  store::AttendanceStore,
};

pub use error::ApiError;
pub use session::SessionKeys;

// ─── Backends ────────────────────────────────────────────────────────────────

/// The concrete collaborators a deployment plugs in.
pub trait Backend: Send + Sync + 'static {
  type Store: AttendanceStore + 'static;
  type Cache: TokenCache + 'static;
  type Renderer: QrRenderer + 'static;
  type Publisher: ArtifactPublisher + 'static;
  type Notifier: Notifier + 'static;
}

// ─── Application state ───────────────────────────────────────────────────────

/// Construction-time settings for [`AppState`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
  pub jwt_secret:  String,
  /// Frontend origin; scan targets and reset links point here.
  pub front_url:   String,
  pub window:      Duration,
  pub scratch_dir: PathBuf,
  pub rules:       PunctualityRules,
}

/// Shared state threaded through all axum handlers.
pub struct AppState<B: Backend> {
  pub store:     Arc<B::Store>,
  pub issuer:    Arc<TokenIssuer<B::Cache, B::Renderer, B::Publisher>>,
  pub admission: Arc<Admission<B::Store, B::Cache>>,
  pub notifier:  Arc<B::Notifier>,
  pub sessions:  Arc<SessionKeys>,
  pub rules:     Arc<PunctualityRules>,
  pub front_url: Arc<str>,
}

impl<B: Backend> Clone for AppState<B> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      issuer:    self.issuer.clone(),
      admission: self.admission.clone(),
      notifier:  self.notifier.clone(),
      sessions:  self.sessions.clone(),
      rules:     self.rules.clone(),
      front_url: self.front_url.clone(),
    }
  }
}

impl<B: Backend> AppState<B> {
  pub fn new(
    store: Arc<B::Store>,
    cache: Arc<B::Cache>,
    renderer: B::Renderer,
    publisher: B::Publisher,
    notifier: B::Notifier,
    settings: ApiSettings,
  ) -> Self {
    let front_url = settings.front_url.trim_end_matches('/').to_owned();
    let issuer = TokenIssuer::new(cache.clone(), renderer, publisher, IssuerConfig {
      window:      settings.window,
      front_url:   front_url.clone(),
      scratch_dir: settings.scratch_dir,
    });
    let admission = Admission::new(store.clone(), cache, settings.window);

    Self {
      store,
      issuer: Arc::new(issuer),
      admission: Arc::new(admission),
      notifier: Arc::new(notifier),
      sessions: Arc::new(SessionKeys::new(settings.jwt_secret.as_bytes())),
      rules: Arc::new(settings.rules),
      front_url: front_url.into(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<B: Backend>(state: AppState<B>) -> Router<()> {
  Router::new()
    // QR issuance
    .route("/generate/qr", get(qr::issue::<B>))
    .route("/generate/qr/reset", post(qr::reset::<B>))
    // Check-ins
    .route("/checkin", post(checkins::check_in::<B>))
    .route("/checkins", get(checkins::list::<B>))
    .route("/checkin/last", get(checkins::last::<B>))
    .route("/ranking", get(checkins::ranking::<B>))
    // Dashboard
    .route("/dashboard", get(dashboard::summary::<B>))
    .route("/dashboard/punctuality-ranking", get(dashboard::punctuality_ranking::<B>))
    .route("/dashboard/punctuality-meter", get(dashboard::punctuality_meter::<B>))
    .route("/dashboard/punctuality-scatter", get(dashboard::punctuality_scatter::<B>))
    .route("/dashboard/roles-distribution", get(dashboard::roles_distribution::<B>))
    // Accounts
    .route("/signup", post(account::signup::<B>))
    .route("/login", post(account::login::<B>))
    .route("/forgot-password", post(account::forgot_password::<B>))
    .route("/reset-password", post(account::reset_password::<B>))
    .route("/me", get(profile::get_me::<B>).put(profile::update_me::<B>))
    // Volunteers
    .route("/volunteers", get(volunteers::list::<B>).post(volunteers::create::<B>))
    .route("/volunteers/{id}", get(volunteers::get_one::<B>))
    .with_state(state)
}
