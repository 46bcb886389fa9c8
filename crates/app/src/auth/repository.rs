//! Auth repository.

use sqlx::{PgPool, Postgres, Row, query};

use crate::domain::users::records::{Requester, Role, UserUuid};

const FIND_USER_BY_TOKEN_HASH_SQL: &str = include_str!("sql/find_user_by_token_hash.sql");

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn find_requester_by_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<Requester>, sqlx::Error> {
        let Some(row) = query::<Postgres>(FIND_USER_BY_TOKEN_HASH_SQL)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let role: String = row.try_get("role")?;

        let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(Some(Requester {
            user: UserUuid::from_uuid(row.try_get("uuid")?),
            role,
        }))
    }
}
