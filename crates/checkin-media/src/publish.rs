//! Artifact publishers.

use std::{
  path::{Path, PathBuf},
  time::{SystemTime, UNIX_EPOCH},
};

use checkin_core::media::ArtifactPublisher;
use reqwest::{
  Client,
  multipart::{Form, Part},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{Error, Result, error::check_status};

// ─── Local directory ─────────────────────────────────────────────────────────

/// Copies artifacts into a directory the server exposes under `/qr`.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
  public_dir:      PathBuf,
  public_base_url: String,
}

impl LocalPublisher {
  pub fn new(public_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self {
      public_dir:      public_dir.into(),
      public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
    }
  }

  pub fn public_dir(&self) -> &Path { &self.public_dir }
}

impl ArtifactPublisher for LocalPublisher {
  type Error = Error;

  async fn publish(&self, path: &Path, public_id: &str) -> Result<String> {
    tokio::fs::create_dir_all(&self.public_dir).await?;
    let file_name = format!("{public_id}.png");
    tokio::fs::copy(path, self.public_dir.join(&file_name)).await?;
    Ok(format!("{}/qr/{file_name}", self.public_base_url))
  }
}

// ─── Cloudinary ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
  pub cloud_name: String,
  pub api_key:    String,
  pub api_secret: String,
}

/// Signed uploads to the Cloudinary image API.
#[derive(Clone)]
pub struct CloudinaryPublisher {
  client:      Client,
  credentials: CloudinaryCredentials,
}

#[derive(Deserialize)]
struct UploadResponse {
  secure_url: String,
}

impl CloudinaryPublisher {
  pub fn new(credentials: CloudinaryCredentials) -> Self {
    Self { client: Client::new(), credentials }
  }

  fn endpoint(&self) -> String {
    format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.credentials.cloud_name)
  }
}

/// Signature over the signed parameters in alphabetical order, followed by
/// the API secret.
fn sign(public_id: &str, timestamp: u64, api_secret: &str) -> String {
  let payload = format!("public_id={public_id}&timestamp={timestamp}{api_secret}");
  hex::encode(Sha256::digest(payload.as_bytes()))
}

impl ArtifactPublisher for CloudinaryPublisher {
  type Error = Error;

  async fn publish(&self, path: &Path, public_id: &str) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let timestamp = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default();
    let signature = sign(public_id, timestamp, &self.credentials.api_secret);

    let file = Part::bytes(bytes)
      .file_name(format!("{public_id}.png"))
      .mime_str("image/png")?;
    let form = Form::new()
      .text("api_key", self.credentials.api_key.clone())
      .text("public_id", public_id.to_owned())
      .text("timestamp", timestamp.to_string())
      .text("signature", signature)
      .text("signature_algorithm", "sha256")
      .part("file", file);

    tracing::debug!(public_id, "uploading artifact to cloudinary");
    let res = self.client.post(self.endpoint()).multipart(form).send().await?;
    let uploaded: UploadResponse = check_status("cloudinary", res).await?.json().await?;
    Ok(uploaded.secure_url)
  }
}

// ─── Runtime choice ──────────────────────────────────────────────────────────

pub enum Publisher {
  Local(LocalPublisher),
  Cloudinary(CloudinaryPublisher),
}

impl ArtifactPublisher for Publisher {
  type Error = Error;

  async fn publish(&self, path: &Path, public_id: &str) -> Result<String> {
    match self {
      Self::Local(p) => p.publish(path, public_id).await,
      Self::Cloudinary(p) => p.publish(path, public_id).await,
    }
  }
}
