use std::sync::{Arc, Mutex};

use chrono::Duration;
use sesame::{
    ErrorCode, InstanceConfig, RequestMetadata, Sesame, SesameConfig, SessionConfig,
};
use sesame_core::{
    CredentialKey, NewUser, User,
    repositories::{
        CredentialRepository, CredentialRepositoryProvider, UserRepository,
        UserRepositoryProvider,
    },
    services::{MagicCodeConfig, MagicCodeDispatcher, MagicCodeMessage},
    storage::MemoryStorage,
};

const ORIGIN: &str = "https://space.example.com";

#[derive(Default)]
struct RecordingDispatcher {
    messages: Mutex<Vec<MagicCodeMessage>>,
}

impl RecordingDispatcher {
    fn last_code(&self) -> String {
        self.messages
            .lock()
            .unwrap()
            .last()
            .expect("no message dispatched")
            .code
            .clone()
    }

    fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl MagicCodeDispatcher for RecordingDispatcher {
    fn dispatch(&self, message: MagicCodeMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

struct Fixture {
    sesame: Sesame<MemoryStorage>,
    storage: Arc<MemoryStorage>,
    dispatcher: Arc<RecordingDispatcher>,
}

fn fixture_with(config: SesameConfig) -> Fixture {
    let _ = tracing_subscriber::fmt().try_init();

    let storage = Arc::new(MemoryStorage::new());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let sesame = Sesame::new(storage.clone(), dispatcher.clone(), config);

    Fixture {
        sesame,
        storage,
        dispatcher,
    }
}

fn fixture() -> Fixture {
    fixture_with(SesameConfig::default())
}

async fn existing_user(storage: &MemoryStorage, email: &str) -> User {
    storage
        .user()
        .create(NewUser::builder().email(email).build().unwrap())
        .await
        .unwrap()
}

fn metadata() -> RequestMetadata {
    RequestMetadata::new(Some("test-agent".to_string()), Some("10.0.0.1".to_string()))
}

#[tokio::test]
async fn test_generate_returns_identifier_and_dispatches_code() {
    let f = fixture();

    let issued = f
        .sesame
        .magic_generate("  Ada@Example.com ", ORIGIN)
        .await
        .unwrap();

    assert_eq!(f.dispatcher.count(), 1);
    let message = f.dispatcher.messages.lock().unwrap()[0].clone();
    assert_eq!(message.email, "ada@example.com");
    assert_eq!(message.identifier, issued.identifier);
    assert_eq!(message.origin, ORIGIN);
    assert_ne!(message.code, issued.identifier);
}

#[tokio::test]
async fn test_generate_does_not_check_existence() {
    let f = fixture();
    // No account for this email; generation still succeeds.
    f.sesame
        .magic_generate("new@example.com", ORIGIN)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generate_gates() {
    let not_setup = fixture_with(
        SesameConfig::default().with_instance(InstanceConfig::default().setup_done(false)),
    );
    let err = not_setup
        .sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InstanceNotConfigured);

    let disabled = fixture_with(
        SesameConfig::default()
            .with_instance(InstanceConfig::default().magic_login_enabled(false)),
    );
    let err = disabled
        .sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MagicLinkLoginDisabled);
    assert_eq!(disabled.dispatcher.count(), 0);
}

#[tokio::test]
async fn test_generate_validates_email() {
    let f = fixture();

    let err = f.sesame.magic_generate("   ", ORIGIN).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EmailRequired);

    let err = f
        .sesame
        .magic_generate("not-an-email", ORIGIN)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidEmail);
    assert_eq!(err.error_dict().error_code, "5005");
}

#[tokio::test]
async fn test_generate_attempts_exhausted() {
    let f = fixture();

    for _ in 0..3 {
        f.sesame
            .magic_generate("ada@example.com", ORIGIN)
            .await
            .unwrap();
    }
    let err = f
        .sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmailCodeAttemptExhaustedSignIn);
}

#[tokio::test]
async fn test_sign_in() {
    let f = fixture();
    let user = existing_user(&f.storage, "ada@example.com").await;

    f.sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    let code = f.dispatcher.last_code();

    let outcome = f
        .sesame
        .magic_sign_in("ADA@example.com", &format!(" {code} "), metadata())
        .await
        .unwrap();

    assert_eq!(outcome.user.id, user.id);
    assert_eq!(outcome.session.user_id, user.id);
    assert_eq!(outcome.session.user_agent.as_deref(), Some("test-agent"));
    assert_eq!(outcome.session.ip_address.as_deref(), Some("10.0.0.1"));
    assert!(!outcome.requires_password_setup);

    let session = f
        .sesame
        .get_session(&outcome.session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, user.id);

    let user = f.sesame.get_user(&user.id).await.unwrap().unwrap();
    assert!(user.is_email_verified());

    // Codes are single use.
    let err = f
        .sesame
        .magic_sign_in("ada@example.com", &code, metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidMagicCodeSignIn);
}

#[tokio::test]
async fn test_sign_in_requires_email_and_code() {
    let f = fixture();

    for (email, code) in [("", "abcd-efgh-ijkl"), ("ada@example.com", "  ")] {
        let err = f
            .sesame
            .magic_sign_in(email, code, metadata())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MagicSignInEmailCodeRequired);
    }
}

#[tokio::test]
async fn test_sign_in_unknown_user_leaves_code_unconsumed() {
    let f = fixture();

    f.sesame
        .magic_generate("ghost@example.com", ORIGIN)
        .await
        .unwrap();
    let code = f.dispatcher.last_code();

    let err = f
        .sesame
        .magic_sign_in("ghost@example.com", &code, metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserDoesNotExist);

    let credential = f
        .storage
        .credential()
        .find(&CredentialKey::magic("ghost@example.com"))
        .await
        .unwrap()
        .unwrap();
    assert!(!credential.is_consumed());

    // The same code still works for sign-up.
    f.sesame
        .magic_sign_up("ghost@example.com", &code, metadata())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_in_deactivated_user() {
    let f = fixture();
    let mut user = existing_user(&f.storage, "ada@example.com").await;
    user.is_active = false;
    f.storage.user().put(user);

    f.sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    let err = f
        .sesame
        .magic_sign_in("ada@example.com", &f.dispatcher.last_code(), metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserAccountDeactivated);
}

#[tokio::test]
async fn test_sign_in_wrong_and_expired_code() {
    let f = fixture();
    existing_user(&f.storage, "ada@example.com").await;

    let err = f
        .sesame
        .magic_sign_in("ada@example.com", "abcd-efgh-ijkl", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidMagicCodeSignIn);

    let expired = fixture_with(
        SesameConfig::default()
            .with_magic_code(MagicCodeConfig::default().with_ttl(Duration::seconds(-1))),
    );
    existing_user(&expired.storage, "ada@example.com").await;
    expired
        .sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    let err = expired
        .sesame
        .magic_sign_in("ada@example.com", &expired.dispatcher.last_code(), metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpiredMagicCodeSignIn);
}

#[tokio::test]
async fn test_sign_in_requires_password_setup() {
    let f = fixture();
    let mut user = existing_user(&f.storage, "ada@example.com").await;
    user.is_password_autoset = true;
    user.is_onboarded = true;
    f.storage.user().put(user);

    f.sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    let outcome = f
        .sesame
        .magic_sign_in("ada@example.com", &f.dispatcher.last_code(), metadata())
        .await
        .unwrap();
    assert!(outcome.requires_password_setup);
}

#[tokio::test]
async fn test_sign_up() {
    let f = fixture_with(
        SesameConfig::default().with_session(SessionConfig::default().expires_in(Duration::hours(1))),
    );

    f.sesame
        .magic_generate("new@example.com", ORIGIN)
        .await
        .unwrap();
    let outcome = f
        .sesame
        .magic_sign_up("new@example.com", &f.dispatcher.last_code(), metadata())
        .await
        .unwrap();

    assert_eq!(outcome.user.email, "new@example.com");
    assert!(outcome.user.is_password_autoset);
    assert!(outcome.user.is_email_verified());
    assert_eq!(
        outcome.session.expires_at - outcome.session.created_at,
        Duration::hours(1)
    );

    let err = f
        .sesame
        .magic_sign_up("new@example.com", "abcd-efgh-ijkl", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserAlreadyExist);
}

#[tokio::test]
async fn test_sign_up_existing_user_leaves_code_unconsumed() {
    let f = fixture();
    existing_user(&f.storage, "ada@example.com").await;

    f.sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    let code = f.dispatcher.last_code();

    let err = f
        .sesame
        .magic_sign_up("ada@example.com", &code, metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UserAlreadyExist);

    f.sesame
        .magic_sign_in("ada@example.com", &code, metadata())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_up_gates_and_errors() {
    let disabled = fixture_with(
        SesameConfig::default().with_instance(InstanceConfig::default().signup_enabled(false)),
    );
    let err = disabled
        .sesame
        .magic_sign_up("new@example.com", "abcd-efgh-ijkl", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SignupDisabled);

    let not_setup = fixture_with(
        SesameConfig::default().with_instance(InstanceConfig::default().setup_done(false)),
    );
    let err = not_setup
        .sesame
        .magic_sign_up("new@example.com", "abcd-efgh-ijkl", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InstanceNotConfigured);

    let f = fixture();
    let err = f
        .sesame
        .magic_sign_up("new@example.com", "", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MagicSignUpEmailCodeRequired);

    let err = f
        .sesame
        .magic_sign_up("new@example.com", "abcd-efgh-ijkl", metadata())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidMagicCodeSignUp);
}

#[tokio::test]
async fn test_cleanup_expired() {
    let f = fixture_with(
        SesameConfig::default()
            .with_magic_code(MagicCodeConfig::default().with_ttl(Duration::seconds(-1))),
    );

    f.sesame
        .magic_generate("ada@example.com", ORIGIN)
        .await
        .unwrap();
    assert_eq!(f.sesame.cleanup_expired().await.unwrap(), 1);
    assert_eq!(f.sesame.cleanup_expired().await.unwrap(), 0);
}
