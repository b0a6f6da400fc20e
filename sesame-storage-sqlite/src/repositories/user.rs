use crate::{RowError, to_datetime, to_optional_datetime};
use async_trait::async_trait;
use sesame_core::{
    Error, NewUser, StorageError, User, UserId, error::utilities::DatabaseResultExt,
    repositories::UserRepository,
};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SqliteUser {
    pub id: String,
    pub email: String,
    pub is_active: bool,
    pub is_password_autoset: bool,
    pub is_onboarded: bool,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = RowError;

    fn try_from(user: SqliteUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(&user.id),
            email: user.email,
            is_active: user.is_active,
            is_password_autoset: user.is_password_autoset,
            is_onboarded: user.is_onboarded,
            email_verified_at: to_optional_datetime(user.email_verified_at)?,
            created_at: to_datetime(user.created_at)?,
            updated_at: to_datetime(user.updated_at)?,
        })
    }
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = chrono::Utc::now().timestamp();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, email, is_password_autoset, email_verified_at, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(user.is_password_autoset)
        .bind(user.email_verified_at.map(|dt| dt.timestamp()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => Error::Storage(StorageError::Constraint(
                format!("User with email {} already exists", user.email),
            )),
            _ => Error::Storage(StorageError::Database(e.to_string())),
        })?;

        Ok(sqlite_user.try_into()?)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_db_err()?;

        Ok(sqlite_user.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_db_err()?;

        Ok(sqlite_user.map(User::try_from).transpose()?)
    }

    async fn mark_email_verified(&self, user_id: &UserId) -> Result<(), Error> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE users SET email_verified_at = ?1, updated_at = ?1 WHERE id = ?2",
        )
        .bind(now)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_db_err()?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::tests::setup_pool;

    fn new_user(email: &str) -> NewUser {
        NewUser::builder()
            .email(email)
            .is_password_autoset(true)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = SqliteUserRepository::new(setup_pool().await);

        let created = repo.create(new_user("ada@example.com")).await.unwrap();
        assert_eq!(created.email, "ada@example.com");
        assert!(created.is_active);
        assert!(created.is_password_autoset);
        assert!(!created.is_onboarded);
        assert!(!created.is_email_verified());

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, created.email);

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_error() {
        let repo = SqliteUserRepository::new(setup_pool().await);

        repo.create(new_user("ada@example.com")).await.unwrap();
        let err = repo.create(new_user("ada@example.com")).await.unwrap_err();

        assert!(matches!(err, Error::Storage(StorageError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_mark_email_verified() {
        let repo = SqliteUserRepository::new(setup_pool().await);
        let user = repo.create(new_user("ada@example.com")).await.unwrap();

        repo.mark_email_verified(&user.id).await.unwrap();
        let user = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(user.is_email_verified());

        let err = repo
            .mark_email_verified(&UserId::new("usr_missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::NotFound)));
    }
}
