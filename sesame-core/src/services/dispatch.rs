//! Out-of-band delivery of magic codes.
//!
//! Issuing a code never waits on email. The authentication adapter hands a
//! [`MagicCodeMessage`] to a [`MagicCodeDispatcher`] and returns immediately. The
//! [`QueuedDispatcher`] pushes it onto an unbounded channel drained by a worker
//! task that calls a [`MagicCodeMailer`]. Delivery failures are logged and
//! dropped; the client can always request another code.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::Error;

/// Everything needed to deliver one code.
#[derive(Clone)]
pub struct MagicCodeMessage {
    pub email: String,
    pub identifier: String,
    pub code: String,
    /// Base URL of the site the code was requested from, used to build the link.
    pub origin: String,
}

impl std::fmt::Debug for MagicCodeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicCodeMessage")
            .field("email", &self.email)
            .field("identifier", &self.identifier)
            .field("code", &"[redacted]")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Fire-and-forget handoff of a message. Must not block.
pub trait MagicCodeDispatcher: Send + Sync + 'static {
    fn dispatch(&self, message: MagicCodeMessage);
}

/// Actually sends the message. Called from the dispatcher's worker, never from a request.
#[async_trait]
pub trait MagicCodeMailer: Send + Sync + 'static {
    async fn send_magic_code(&self, message: &MagicCodeMessage) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct QueuedDispatcher {
    sender: mpsc::UnboundedSender<MagicCodeMessage>,
}

impl QueuedDispatcher {
    /// Start the delivery worker.
    ///
    /// The worker runs until `shutdown` changes, after which it delivers what is
    /// already queued and exits, or until every dispatcher clone is dropped.
    pub fn spawn<M: MagicCodeMailer>(
        mailer: Arc<M>,
        mut shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<MagicCodeMessage>();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    message = receiver.recv() => match message {
                        Some(message) => deliver(mailer.as_ref(), message).await,
                        None => {
                            tracing::info!("All magic code dispatchers dropped, stopping delivery worker");
                            return;
                        }
                    },
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down magic code delivery worker");
                        break;
                    }
                }
            }

            receiver.close();
            while let Some(message) = receiver.recv().await {
                deliver(mailer.as_ref(), message).await;
            }
        });

        (Self { sender }, handle)
    }
}

impl MagicCodeDispatcher for QueuedDispatcher {
    fn dispatch(&self, message: MagicCodeMessage) {
        if let Err(e) = self.sender.send(message) {
            tracing::error!(
                identifier = %e.0.identifier,
                "Magic code delivery worker is not running, message dropped"
            );
        }
    }
}

async fn deliver<M: MagicCodeMailer + ?Sized>(mailer: &M, message: MagicCodeMessage) {
    match mailer.send_magic_code(&message).await {
        Ok(()) => {
            tracing::debug!(identifier = %message.identifier, "Delivered magic code");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                identifier = %message.identifier,
                "Failed to deliver magic code"
            );
        }
    }
}
