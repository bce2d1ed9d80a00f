//! Users service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        SqliteUsersRepository, UsersServiceError,
        records::{UserId, UserRecord},
    },
};

#[derive(Debug, Clone)]
pub struct SqliteUsersService {
    db: Db,
    repository: SqliteUsersRepository,
}

impl SqliteUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteUsersRepository::new(),
        }
    }

    async fn set_disabled_at(
        &self,
        user: UserId,
        disabled_at: Option<Timestamp>,
    ) -> Result<(), UsersServiceError> {
        let mut tx = self.db.begin_write().await?;

        let rows_affected = self
            .repository
            .set_disabled_at(&mut tx, user, disabled_at)
            .await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl UsersService for SqliteUsersService {
    async fn create_user(&self) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_write().await?;

        let user = self
            .repository
            .create_user(&mut tx, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn get_user(&self, user: UserId) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_read().await?;

        let record = self
            .repository
            .get_user(&mut tx, user)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn disable_user(&self, user: UserId) -> Result<(), UsersServiceError> {
        self.set_disabled_at(user, Some(Timestamp::now())).await
    }

    async fn enable_user(&self, user: UserId) -> Result<(), UsersServiceError> {
        self.set_disabled_at(user, None).await
    }
}

#[automock]
#[async_trait]
/// Administrative user operations.
pub trait UsersService: Send + Sync {
    /// Creates a new, enabled, non-superuser user.
    async fn create_user(&self) -> Result<UserRecord, UsersServiceError>;

    /// Retrieves a single user.
    async fn get_user(&self, user: UserId) -> Result<UserRecord, UsersServiceError>;

    /// Disables a user; all of their tokens stop authenticating.
    async fn disable_user(&self, user: UserId) -> Result<(), UsersServiceError>;

    /// Re-enables a previously disabled user.
    async fn enable_user(&self, user: UserId) -> Result<(), UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestDb;

    use super::*;

    #[tokio::test]
    async fn create_user_returns_enabled_regular_user() -> TestResult {
        let test_db = TestDb::new().await?;
        let svc = SqliteUsersService::new(test_db.db.clone());

        let before = Timestamp::now().as_second();
        let user = svc.create_user().await?;

        assert!(!user.superuser);
        assert!(user.is_enabled());
        assert!(user.created_at.as_second() >= before);

        Ok(())
    }

    #[tokio::test]
    async fn created_users_have_distinct_ids() -> TestResult {
        let test_db = TestDb::new().await?;
        let svc = SqliteUsersService::new(test_db.db.clone());

        let a = svc.create_user().await?;
        let b = svc.create_user().await?;

        assert_ne!(a.id, b.id);

        Ok(())
    }

    #[tokio::test]
    async fn disable_then_enable_user() -> TestResult {
        let test_db = TestDb::new().await?;
        let svc = SqliteUsersService::new(test_db.db.clone());
        let user = svc.create_user().await?;

        svc.disable_user(user.id).await?;

        assert!(!svc.get_user(user.id).await?.is_enabled());

        svc.enable_user(user.id).await?;

        assert!(svc.get_user(user.id).await?.is_enabled());

        Ok(())
    }

    #[tokio::test]
    async fn disable_unknown_user_returns_not_found() -> TestResult {
        let test_db = TestDb::new().await?;
        let svc = SqliteUsersService::new(test_db.db.clone());

        let result = svc.disable_user(UserId::from_i64(9_999)).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_user_returns_not_found() -> TestResult {
        let test_db = TestDb::new().await?;
        let svc = SqliteUsersService::new(test_db.db.clone());

        let result = svc.get_user(UserId::from_i64(9_999)).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
