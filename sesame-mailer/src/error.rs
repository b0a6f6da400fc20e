use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Could not write message to disk: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] lettre::error::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Invalid mailer configuration: {0}")]
    Config(String),

    #[error("Send task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
