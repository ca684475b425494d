//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{ExternalIdentity, Identity, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

pub(super) fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let external_id = ExternalIdentity::new(row.external_id)
        .map_err(|err| UserRepositoryError::query(format!("stored identity invalid: {err}")))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        external_id,
        email: row.email,
        name: row.name,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert_or_fetch(&self, identity: &Identity) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            external_id: identity.external_id.as_ref(),
            email: identity.email.as_deref(),
            name: identity.name.as_deref(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::external_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        let row = users::table
            .filter(users::external_id.eq(identity.external_id.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .map_err(map_error)?;

        row_to_user(row)
    }

    async fn find_by_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserRepositoryError::connection))?;

        let row = users::table
            .filter(users::external_id.eq(identity.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_user).transpose()
    }
}
