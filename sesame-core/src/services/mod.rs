//! Services hold the flow logic and are generic over repository traits.
pub mod dispatch;
pub mod magic_auth;
pub mod magic_code;
pub mod mailer;
pub mod session;
pub mod user;

pub use dispatch::{MagicCodeDispatcher, MagicCodeMailer, MagicCodeMessage, QueuedDispatcher};
pub use magic_auth::MagicAuthService;
pub use magic_code::{MagicCodeConfig, MagicCodeService};
#[cfg(feature = "mailer")]
pub use mailer::{MailerDelivery, magic_link};
pub use session::SessionService;
pub use user::UserService;
