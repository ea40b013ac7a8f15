//! Error types for `checkin-media`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("qr encoding error: {0}")]
  Qr(#[from] qrcode::types::QrError),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{service} answered {status}: {body}")]
  Upstream {
    service: &'static str,
    status:  u16,
    body:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Turn a non-success response into [`Error::Upstream`], keeping the body for
/// the log.
pub(crate) async fn check_status(
  service: &'static str,
  res: reqwest::Response,
) -> Result<reqwest::Response> {
  let status = res.status();
  if status.is_success() {
    return Ok(res);
  }
  let body = res.text().await.unwrap_or_default();
  tracing::error!(service, %status, %body, "upstream request failed");
  Err(Error::Upstream { service, status: status.as_u16(), body })
}
