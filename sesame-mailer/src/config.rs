use crate::transports::{SmtpSettings, TlsType};
use crate::{FileTransport, Mailer, MailerError, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_OUTPUT_DIR: &str = "./emails";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
    /// Shown in the subject line and body of the code email.
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp(SmtpSettings),
    File { output_dir: PathBuf },
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            from_address: "noreply@sesame.local".to_string(),
            from_name: None,
            app_name: "Sesame".to_string(),
        }
    }
}

impl MailerConfig {
    /// Read the configuration from `MAILER_*` environment variables.
    ///
    /// | Variable | Default |
    /// | --- | --- |
    /// | `MAILER_SMTP_HOST` | unset: write files instead of sending |
    /// | `MAILER_SMTP_PORT` | relay default |
    /// | `MAILER_SMTP_USERNAME`, `MAILER_SMTP_PASSWORD` | no authentication |
    /// | `MAILER_SMTP_TLS` | `starttls` (`none`, `starttls`, `tls`) |
    /// | `MAILER_FILE_OUTPUT_DIR` | `./emails` |
    /// | `MAILER_FROM_ADDRESS` | `noreply@sesame.local` |
    /// | `MAILER_FROM_NAME` | none |
    /// | `MAILER_APP_NAME` | `Sesame` |
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, MailerError> {
        let transport = match var("MAILER_SMTP_HOST") {
            Some(host) => {
                let port = var("MAILER_SMTP_PORT")
                    .map(|port| {
                        port.parse::<u16>().map_err(|_| {
                            MailerError::Config(format!("MAILER_SMTP_PORT is not a valid port: {port}"))
                        })
                    })
                    .transpose()?;

                let tls = var("MAILER_SMTP_TLS")
                    .map(|tls| {
                        TlsType::parse(&tls).ok_or_else(|| {
                            MailerError::Config(format!(
                                "MAILER_SMTP_TLS must be none, starttls or tls: {tls}"
                            ))
                        })
                    })
                    .transpose()?
                    .unwrap_or_default();

                TransportConfig::Smtp(SmtpSettings {
                    host,
                    port,
                    username: var("MAILER_SMTP_USERNAME"),
                    password: var("MAILER_SMTP_PASSWORD"),
                    tls,
                })
            }
            None => TransportConfig::File {
                output_dir: PathBuf::from(
                    var("MAILER_FILE_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
                ),
            },
        };

        let defaults = Self::default();

        Ok(Self {
            transport,
            from_address: var("MAILER_FROM_ADDRESS").unwrap_or(defaults.from_address),
            from_name: var("MAILER_FROM_NAME"),
            app_name: var("MAILER_APP_NAME").unwrap_or(defaults.app_name),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp(settings) => Ok(Box::new(SmtpTransport::new(settings)?)),
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
        }
    }

    /// The `From` header: `Name <address>` when a name is configured.
    pub fn sender(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{name} <{}>", self.from_address),
            None => self.from_address.clone(),
        }
    }
}
