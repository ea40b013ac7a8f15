//! Rendering, publishing and mail delivery for Checkin.
//!
//! Implements the collaborator traits from [`checkin_core::media`]:
//!
//! - [`PngQrRenderer`] draws scan targets as PNG QR codes.
//! - [`Publisher`] stores rendered artifacts, either in a local directory the
//!   server exposes itself or on Cloudinary.
//! - [`Mailer`] delivers password-reset links through Brevo, or only logs them.

pub mod error;
pub mod mail;
pub mod publish;
pub mod render;

pub use error::{Error, Result};
pub use mail::{BrevoMailer, BrevoSender, LogMailer, Mailer};
pub use publish::{CloudinaryCredentials, CloudinaryPublisher, LocalPublisher, Publisher};
pub use render::PngQrRenderer;
