#![cfg(feature = "sqlite")]

use std::sync::{Arc, Mutex};

use sesame::{ErrorCode, RequestMetadata, Sesame, SesameBuilder, SqliteRepositoryProvider};
use sesame_core::services::{MagicCodeDispatcher, MagicCodeMessage};
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Default)]
struct RecordingDispatcher {
    codes: Mutex<Vec<String>>,
}

impl RecordingDispatcher {
    fn last_code(&self) -> String {
        self.codes.lock().unwrap().last().cloned().expect("no code")
    }
}

impl MagicCodeDispatcher for RecordingDispatcher {
    fn dispatch(&self, message: MagicCodeMessage) {
        self.codes.lock().unwrap().push(message.code);
    }
}

async fn setup() -> (Sesame<SqliteRepositoryProvider>, Arc<RecordingDispatcher>) {
    let _ = tracing_subscriber::fmt().try_init();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create pool");

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let sesame = SesameBuilder::new()
        .with_sqlite_pool(pool)
        .with_dispatcher(dispatcher.clone())
        .apply_migrations(true)
        .build()
        .await
        .expect("Failed to build sesame");

    (sesame, dispatcher)
}

#[tokio::test]
async fn test_sign_up_then_sign_in() {
    let (sesame, dispatcher) = setup().await;
    let origin = "https://space.example.com";

    sesame
        .magic_generate("ada@example.com", origin)
        .await
        .unwrap();
    let signed_up = sesame
        .magic_sign_up(
            "ada@example.com",
            &dispatcher.last_code(),
            RequestMetadata::default(),
        )
        .await
        .unwrap();
    assert!(signed_up.user.is_email_verified());

    sesame
        .magic_generate("ada@example.com", origin)
        .await
        .unwrap();
    let signed_in = sesame
        .magic_sign_in(
            "ada@example.com",
            &dispatcher.last_code(),
            RequestMetadata::default(),
        )
        .await
        .unwrap();
    assert_eq!(signed_in.user.id, signed_up.user.id);

    let session = sesame
        .get_session(&signed_in.session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, signed_up.user.id);
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let (sesame, dispatcher) = setup().await;

    sesame
        .magic_generate("ghost@example.com", "https://space.example.com")
        .await
        .unwrap();
    let err = sesame
        .magic_sign_in(
            "ghost@example.com",
            &dispatcher.last_code(),
            RequestMetadata::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::UserDoesNotExist);
}
