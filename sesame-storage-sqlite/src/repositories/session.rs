use crate::{RowError, to_datetime};
use async_trait::async_trait;
use sesame_core::{
    Error, Session, SessionToken, UserId, error::utilities::DatabaseResultExt,
    repositories::SessionRepository,
};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteSession {
    pub token_hash: String,
    pub user_id: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl SqliteSession {
    /// Rows never hold the token itself, so the caller supplies it.
    fn into_session(self, token: SessionToken) -> Result<Session, RowError> {
        Ok(Session {
            token,
            token_hash: self.token_hash,
            user_id: UserId::new(&self.user_id),
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            created_at: to_datetime(self.created_at)?,
            expires_at: to_datetime(self.expires_at)?,
        })
    }
}

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, user_agent, ip_address, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id.as_str())
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.created_at.timestamp())
        .bind(session.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(session)
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let row = sqlx::query_as::<_, SqliteSession>(
            "SELECT * FROM sessions WHERE token_hash = ?1",
        )
        .bind(token.token_hash())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        let Some(row) = row else {
            return Ok(None);
        };

        if !token.verify_hash(&row.token_hash) {
            return Ok(None);
        }

        Ok(Some(row.into_session(token.clone())?))
    }
}
