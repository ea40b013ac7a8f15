//! Password-reset delivery.

use checkin_core::media::Notifier;
use reqwest::Client;
use serde::Serialize;

use crate::{Error, Result, error::check_status};

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";
const RESET_SUBJECT: &str = "Password reset - Checkin";

/// Sender identity shown on outgoing mail.
#[derive(Debug, Clone, Serialize)]
pub struct BrevoSender {
  pub name:  String,
  pub email: String,
}

/// Transactional mail through the Brevo HTTP API.
#[derive(Clone)]
pub struct BrevoMailer {
  client:  Client,
  api_key: String,
  sender:  BrevoSender,
}

#[derive(Serialize)]
struct Recipient<'a> {
  email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailPayload<'a> {
  sender:       &'a BrevoSender,
  to:           [Recipient<'a>; 1],
  subject:      &'a str,
  html_content: String,
}

impl BrevoMailer {
  pub fn new(api_key: impl Into<String>, sender: BrevoSender) -> Self {
    Self { client: Client::new(), api_key: api_key.into(), sender }
  }
}

fn reset_body(reset_link: &str) -> String {
  format!(
    "<p>Hello!</p>\
     <p>A password reset was requested for your account. Follow the link below to choose a new password:</p>\
     <p><a href=\"{reset_link}\">Reset password</a></p>\
     <p>This link expires in 15 minutes.</p>"
  )
}

impl Notifier for BrevoMailer {
  type Error = Error;

  async fn send_password_reset(&self, email: &str, reset_link: &str) -> Result<()> {
    let payload = EmailPayload {
      sender:       &self.sender,
      to:           [Recipient { email }],
      subject:      RESET_SUBJECT,
      html_content: reset_body(reset_link),
    };

    let res = self
      .client
      .post(BREVO_ENDPOINT)
      .header("api-key", &self.api_key)
      .json(&payload)
      .send()
      .await?;
    check_status("brevo", res).await?;
    tracing::info!(email, "password reset mail sent");
    Ok(())
  }
}

/// Logs reset links instead of sending them. For local development.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Notifier for LogMailer {
  type Error = Error;

  async fn send_password_reset(&self, email: &str, reset_link: &str) -> Result<()> {
    tracing::info!(email, reset_link, "password reset requested (mail delivery disabled)");
    Ok(())
  }
}

pub enum Mailer {
  Brevo(BrevoMailer),
  Log(LogMailer),
}

impl Notifier for Mailer {
  type Error = Error;

  async fn send_password_reset(&self, email: &str, reset_link: &str) -> Result<()> {
    match self {
      Self::Brevo(m) => m.send_password_reset(email, reset_link).await,
      Self::Log(m) => m.send_password_reset(email, reset_link).await,
    }
  }
}
