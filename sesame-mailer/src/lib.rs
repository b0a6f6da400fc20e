//! Email delivery for sesame.
//!
//! This crate knows nothing about authentication. It provides an [`Email`] value,
//! the [`Mailer`] trait that transports implement, and two lettre-backed
//! transports: [`SmtpTransport`] for production and [`FileTransport`] for local
//! development, where every message is written to disk instead of being sent.
//!
//! [`MagicCodeEmail`] builds the single message sesame sends: the one-time code
//! requested on the sign-in page.
pub mod config;
pub mod email;
pub mod error;
pub mod magic_code;
pub mod mailer;
mod message;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use magic_code::MagicCodeEmail;
pub use mailer::Mailer;
pub use transports::{FileTransport, SmtpSettings, SmtpTransport, TlsType};

pub mod prelude {
    pub use crate::{
        Email, EmailBuilder, FileTransport, MagicCodeEmail, Mailer, MailerConfig, MailerError,
        SmtpTransport,
    };
}
