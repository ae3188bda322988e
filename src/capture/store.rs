use std::future::Future;
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{domain::NewSignup, routes::error_chain_fmt};

#[derive(thiserror::Error)]
pub enum InsertError {
    #[error("A signup for this email already exists.")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for InsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Insert-only store that enforces uniqueness of the signup email.
///
/// Implementations must report a uniqueness violation as
/// [`InsertError::Conflict`] and nothing else as such.
pub trait SignupStore {
    fn insert(&self, signup: &NewSignup) -> impl Future<Output = Result<(), InsertError>> + Send;
}

impl<T> SignupStore for Arc<T>
where
    T: SignupStore + Send + Sync,
{
    fn insert(&self, signup: &NewSignup) -> impl Future<Output = Result<(), InsertError>> + Send {
        (**self).insert(signup)
    }
}

#[derive(Clone)]
pub struct PgSignupStore {
    pool: PgPool,
}

impl PgSignupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SignupStore for PgSignupStore {
    #[tracing::instrument(
        name = "Saving new signup in the database",
        skip(self, signup),
        fields(source = %signup.source)
    )]
    async fn insert(&self, signup: &NewSignup) -> Result<(), InsertError> {
        sqlx::query(
            r#"
            INSERT INTO signups (id, email, source, user_agent)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(signup.email.as_ref())
        .bind(signup.source.to_string())
        .bind(&signup.user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                InsertError::Conflict
            } else {
                InsertError::Other(
                    anyhow::Error::new(e).context("Failed to insert a new signup in the database."),
                )
            }
        })?;

        Ok(())
    }
}
