use std::sync::Arc;

use sesame::Sesame;
use sesame_core::RepositoryProvider;

use crate::types::RedirectConfig;

/// Shared state of the sesame routes.
pub struct AuthState<R: RepositoryProvider> {
    pub sesame: Arc<Sesame<R>>,
    pub redirect: Arc<RedirectConfig>,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            sesame: self.sesame.clone(),
            redirect: self.redirect.clone(),
        }
    }
}
