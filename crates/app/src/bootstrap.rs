//! First-start provisioning

use jiff::Timestamp;
use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthServiceError, IssuedApiToken, SqliteAuthRepository, issue_api_token_on},
    database::Db,
    domain::users::SqliteUsersRepository,
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to apply migrations")]
    Migrate(#[from] MigrateError),

    #[error("expected exactly one superuser, found {0}")]
    SuperuserCount(usize),

    #[error("failed to issue superuser token")]
    Token(#[from] AuthServiceError),

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}

/// Migrate the schema and make sure the superuser can sign in.
///
/// Returns the superuser's first token when this call minted it. The
/// plaintext is never retrievable again.
///
/// # Errors
///
/// Fails when migrations fail or the schema does not hold exactly one
/// superuser.
pub async fn initialise(db: &Db) -> Result<Option<IssuedApiToken>, BootstrapError> {
    db.migrate().await?;

    let mut tx = db.begin_write().await?;

    let superusers = SqliteUsersRepository::new().list_superusers(&mut tx).await?;

    let [superuser] = superusers.as_slice() else {
        return Err(BootstrapError::SuperuserCount(superusers.len()));
    };

    let token_count = SqliteAuthRepository::new()
        .count_api_tokens(&mut tx, superuser.id)
        .await?;

    if token_count > 0 {
        return Ok(None);
    }

    let issued = issue_api_token_on(&mut tx, superuser.id, None, Timestamp::now()).await?;

    tx.commit().await?;

    info!(user_id = %superuser.id, "issued superuser token");

    Ok(Some(issued))
}

#[cfg(test)]
mod tests {
    use sqlx::query;
    use testresult::TestResult;

    use crate::{auth::authenticate_bearer, test::TestDb};

    use super::*;

    #[tokio::test]
    async fn first_start_mints_a_working_superuser_token() -> TestResult {
        let test_db = TestDb::new().await?;

        let issued = initialise(&test_db.db).await?;

        assert!(issued.is_some());

        let token = issued.map(|issued| issued.token).unwrap_or_default();
        let mut tx = test_db.db.begin_read().await?;

        let user = authenticate_bearer(&mut tx, &token, Timestamp::now()).await?;

        assert_eq!(user.into_i64(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn later_starts_mint_nothing() -> TestResult {
        let test_db = TestDb::new().await?;

        assert!(initialise(&test_db.db).await?.is_some());
        assert!(initialise(&test_db.db).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn missing_superuser_is_an_error() -> TestResult {
        let test_db = TestDb::new().await?;

        query("DELETE FROM users WHERE superuser = 1")
            .execute(test_db.db.pool())
            .await?;

        let result = initialise(&test_db.db).await;

        assert!(
            matches!(result, Err(BootstrapError::SuperuserCount(0))),
            "got {result:?}"
        );

        Ok(())
    }
}
