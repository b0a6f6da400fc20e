use crate::message::build_message;
use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::Transport;
use lettre::transport::file::FileTransport as LettreFileTransport;
use std::path::{Path, PathBuf};

/// Writes every message as an `.eml` file into a directory. Meant for local development.
#[derive(Debug, Clone)]
pub struct FileTransport {
    transport: LettreFileTransport,
    output_dir: PathBuf,
}

impl FileTransport {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, MailerError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            transport: LettreFileTransport::new(&output_dir),
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Mailer for FileTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let message = build_message(email)?;

        // lettre's FileTransport is sync
        let transport = self.transport.clone();
        let id = tokio::task::spawn_blocking(move || transport.send(&message)).await??;

        tracing::debug!(id = %id, dir = %self.output_dir.display(), "Wrote email to disk");
        Ok(())
    }
}
