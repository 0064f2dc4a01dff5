/*
 * Responsibility
 * - SQLx による login_info テーブルへのアクセス
 * - すべてプレースホルダでバインド (ユーザ入力を SQL に埋め込まない)
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::credential_store::{
    AccountSummary, CredentialStore, RowLookup, ScalarLookup, Write,
};
use crate::repos::error::StoreResult;

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn lookup_scalar(&self, lookup: ScalarLookup<'_>) -> StoreResult<Option<String>> {
        // Values come back as text; parsing is the caller's job.
        let value = match lookup {
            ScalarLookup::AccountId {
                username,
                password_hash,
            } => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT id::text
                    FROM login_info
                    WHERE username = $1 AND user_pass = $2
                    "#,
                )
                .bind(username)
                .bind(password_hash)
                .fetch_optional(&self.pool)
                .await?
            }
            ScalarLookup::Salt { username } => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT salt
                    FROM login_info
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
            }
            ScalarLookup::AccessLevelByUsername { username } => {
                sqlx::query_scalar::<_, Option<String>>(
                    r#"
                    SELECT access_lvl::text
                    FROM login_info
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
                .flatten()
            }
            ScalarLookup::UsernameByToken { token, now } => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT username
                    FROM login_info
                    WHERE token = $1 AND expire_date >= $2
                    "#,
                )
                .bind(token)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?
            }
            ScalarLookup::AccessLevelByToken { token, username } => {
                // No row => None; row with a null level => Some("").
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT COALESCE(access_lvl::text, '')
                    FROM login_info
                    WHERE token = $1 AND username = $2
                    "#,
                )
                .bind(token)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(value)
    }

    async fn lookup_row(&self, lookup: RowLookup<'_>) -> StoreResult<Option<AccountSummary>> {
        let row = match lookup {
            RowLookup::AccountByUsername { username } => {
                sqlx::query_as::<_, AccountSummary>(
                    r#"
                    SELECT id, username, access_lvl AS access_level
                    FROM login_info
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row)
    }

    async fn execute(&self, write: Write<'_>) -> StoreResult<u64> {
        let done = match write {
            Write::StoreToken {
                token,
                username,
                password_hash,
                expires_at,
            } => {
                sqlx::query(
                    r#"
                    UPDATE login_info
                    SET token = $1,
                        expire_date = $2
                    WHERE username = $3 AND user_pass = $4
                    "#,
                )
                .bind(token)
                .bind(expires_at)
                .bind(username)
                .bind(password_hash)
                .execute(&self.pool)
                .await?
            }
            Write::ClearExpired { cutoff } => {
                sqlx::query(
                    r#"
                    UPDATE login_info
                    SET token = NULL,
                        expire_date = NULL
                    WHERE expire_date < $1
                    "#,
                )
                .bind(cutoff)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(done.rows_affected())
    }
}
