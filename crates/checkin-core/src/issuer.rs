//! Rotating token issuer.
//!
//! One token is live per window. Its rendered QR artifact is cached under
//! [`CURRENT_QR_KEY`] so repeated issuance requests inside the window hand out
//! the same artifact; when that key expires or is deleted the next request
//! mints a fresh token.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  cache::{CURRENT_QR_KEY, TOKEN_VALID, TokenCache, token_key},
  media::{ArtifactPublisher, QrRenderer},
};

/// Default validity window of a token and of its admission markers.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3 * 60 * 60);

/// Construction-time settings for [`TokenIssuer`].
#[derive(Debug, Clone)]
pub struct IssuerConfig {
  pub window:      Duration,
  /// Frontend origin; the scan target is `{front_url}/checkin?token=...`.
  pub front_url:   String,
  /// Directory for the short-lived rendered image before it is published.
  pub scratch_dir: PathBuf,
}

/// The artifact handed to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
  pub url:        String,
  pub token:      String,
  pub expires_in: Duration,
}

/// Cached form of the current artifact.
#[derive(Debug, Serialize, Deserialize)]
struct CachedArtifact {
  url:   String,
  token: String,
}

pub struct TokenIssuer<C, R, P> {
  cache:     Arc<C>,
  renderer:  R,
  publisher: P,
  config:    IssuerConfig,
}

impl<C, R, P> TokenIssuer<C, R, P>
where
  C: TokenCache,
  R: QrRenderer,
  P: ArtifactPublisher,
{
  pub fn new(cache: Arc<C>, renderer: R, publisher: P, config: IssuerConfig) -> Self {
    Self { cache, renderer, publisher, config }
  }

  pub fn window(&self) -> Duration { self.config.window }

  /// Return the artifact of the current window, minting one if there is none.
  pub async fn issue_or_reuse(&self) -> Result<QrArtifact> {
    if let Some(current) = self.current().await? {
      return Ok(current);
    }

    let window = self.config.window;
    let token = generate_token();

    self
      .cache
      .set(&token_key(&token), TOKEN_VALID, window)
      .await
      .map_err(Error::cache)?;

    let scan_url = format!(
      "{}/checkin?token={token}",
      self.config.front_url.trim_end_matches('/')
    );
    let public_id = format!("qr-{token}");

    let url = {
      let scratch = ScratchFile::new(self.config.scratch_dir.join(format!("{public_id}.png")));
      self
        .renderer
        .render(&scan_url, scratch.path())
        .map_err(|e| Error::Render(Box::new(e)))?;
      self
        .publisher
        .publish(scratch.path(), &public_id)
        .await
        .map_err(|e| Error::Publish(Box::new(e)))?
    };

    let cached = serde_json::to_string(&CachedArtifact {
      url:   url.clone(),
      token: token.clone(),
    })?;
    // An uncached artifact would let every request mint its own token.
    self
      .cache
      .set(CURRENT_QR_KEY, &cached, window)
      .await
      .map_err(Error::cache)?;

    tracing::info!(%url, "issued check-in token");
    Ok(QrArtifact { url, token, expires_in: window })
  }

  /// Drop the cached artifact so the next issuance mints a new token.
  ///
  /// Tokens already handed out stay valid until their own expiry.
  pub async fn regenerate(&self) -> Result<()> {
    self.cache.delete(CURRENT_QR_KEY).await.map_err(Error::cache)?;
    tracing::info!("qr artifact reset");
    Ok(())
  }

  async fn current(&self) -> Result<Option<QrArtifact>> {
    let Some(raw) = self.cache.get(CURRENT_QR_KEY).await.map_err(Error::cache)? else {
      return Ok(None);
    };

    let cached: CachedArtifact = match serde_json::from_str(&raw) {
      Ok(c) => c,
      Err(e) => {
        tracing::warn!(error = %e, "discarding unreadable cached qr artifact");
        return Ok(None);
      }
    };
    if cached.url.is_empty() || cached.token.is_empty() {
      return Ok(None);
    }

    match self.cache.ttl(CURRENT_QR_KEY).await.map_err(Error::cache)? {
      Some(ttl) if !ttl.is_zero() => Ok(Some(QrArtifact {
        url:        cached.url,
        token:      cached.token,
        expires_in: ttl,
      })),
      _ => Ok(None),
    }
  }
}

/// 128 bits from the OS RNG, hex-encoded.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 16];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

// ─── Scratch file ────────────────────────────────────────────────────────────

/// A path that is removed when the guard goes out of scope.
struct ScratchFile {
  path: PathBuf,
}

impl ScratchFile {
  fn new(path: PathBuf) -> Self { Self { path } }

  fn path(&self) -> &Path { &self.path }
}

impl Drop for ScratchFile {
  fn drop(&mut self) {
    match std::fs::remove_file(&self.path) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch file"),
    }
  }
}
