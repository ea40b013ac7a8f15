//! Traits for the outward-facing collaborators: QR rendering, artifact
//! publishing, and password-reset notifications.

use std::{future::Future, path::Path};

/// Renders a scan target into an image file.
pub trait QrRenderer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write a scannable image encoding `content` to `dest`.
  fn render(&self, content: &str, dest: &Path) -> Result<(), Self::Error>;
}

/// Durable object storage for rendered artifacts.
pub trait ArtifactPublisher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Publish the file at `path` under `public_id` and return a stable URL.
  fn publish<'a>(
    &'a self,
    path: &'a Path,
    public_id: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// Delivers password-reset links.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_password_reset<'a>(
    &'a self,
    email: &'a str,
    reset_link: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
