use chrono::Duration;
use sesame_core::services::MagicCodeConfig;

/// Instance-wide switches that gate every magic-code entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Nothing is served until the instance has been set up.
    pub is_setup_done: bool,
    pub magic_login_enabled: bool,
    pub signup_enabled: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            is_setup_done: true,
            magic_login_enabled: true,
            signup_enabled: true,
        }
    }
}

impl InstanceConfig {
    pub fn setup_done(mut self, is_setup_done: bool) -> Self {
        self.is_setup_done = is_setup_done;
        self
    }

    pub fn magic_login_enabled(mut self, enabled: bool) -> Self {
        self.magic_login_enabled = enabled;
        self
    }

    pub fn signup_enabled(mut self, enabled: bool) -> Self {
        self.signup_enabled = enabled;
        self
    }
}

/// The configuration for sessions bound after a successful exchange.
///
/// # Example
///
/// ```rust
/// use sesame::SessionConfig;
/// use chrono::Duration;
///
/// let config = SessionConfig::default().expires_in(Duration::days(7));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The duration until the session expires
    pub expires_in: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::days(30),
        }
    }
}

impl SessionConfig {
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires_in = duration;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SesameConfig {
    pub instance: InstanceConfig,
    pub magic_code: MagicCodeConfig,
    pub session: SessionConfig,
}

impl SesameConfig {
    pub fn with_instance(mut self, instance: InstanceConfig) -> Self {
        self.instance = instance;
        self
    }

    pub fn with_magic_code(mut self, magic_code: MagicCodeConfig) -> Self {
        self.magic_code = magic_code;
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}
