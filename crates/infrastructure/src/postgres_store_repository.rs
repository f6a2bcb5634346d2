use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use vitrine_application::{StoreDeleteOutcome, StoreRepository};
use vitrine_core::{AppError, AppResult, NonEmptyString, StoreId};
use vitrine_domain::{ResourceKind, Store};

use crate::postgres_catalog_repository::table_name;

/// PostgreSQL-backed store repository.
#[derive(Clone)]
pub struct PostgresStoreRepository {
    pool: PgPool,
}

impl PostgresStoreRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    owner_subject: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoreRow {
    fn into_store(self) -> AppResult<Store> {
        let id = self.id;
        Store::new(
            StoreId::from_uuid(id),
            self.name,
            self.owner_subject,
            self.created_at,
            self.updated_at,
        )
        .map_err(|error| {
            AppError::Internal(format!("persisted store '{id}' is invalid: {error}"))
        })
    }
}

#[async_trait]
impl StoreRepository for PostgresStoreRepository {
    async fn find_store(&self, store_id: StoreId) -> AppResult<Option<Store>> {
        sqlx::query_as::<_, StoreRow>(
            r#"
            SELECT id, name, owner_subject, created_at, updated_at
            FROM stores
            WHERE id = $1
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find store '{store_id}': {error}")))?
        .map(StoreRow::into_store)
        .transpose()
    }

    async fn list_stores_for_owner(&self, owner_subject: &str) -> AppResult<Vec<Store>> {
        sqlx::query_as::<_, StoreRow>(
            r#"
            SELECT id, name, owner_subject, created_at, updated_at
            FROM stores
            WHERE owner_subject = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list stores for subject '{owner_subject}': {error}"
            ))
        })?
        .into_iter()
        .map(StoreRow::into_store)
        .collect()
    }

    async fn create_store(&self, owner_subject: &str, name: NonEmptyString) -> AppResult<Store> {
        sqlx::query_as::<_, StoreRow>(
            r#"
            INSERT INTO stores (id, name, owner_subject)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_subject, created_at, updated_at
            "#,
        )
        .bind(StoreId::new().as_uuid())
        .bind(name.as_str())
        .bind(owner_subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create store: {error}")))?
        .into_store()
    }

    async fn rename_store(&self, store_id: StoreId, name: NonEmptyString) -> AppResult<Store> {
        sqlx::query_as::<_, StoreRow>(
            r#"
            UPDATE stores
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, owner_subject, created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to rename store '{store_id}': {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("store '{store_id}' does not exist")))?
        .into_store()
    }

    async fn delete_empty_store(&self, store_id: StoreId) -> AppResult<StoreDeleteOutcome> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM stores
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to lock store '{store_id}': {error}"))
        })?;
        if locked.is_none() {
            return Ok(StoreDeleteOutcome::NotFound);
        }

        for kind in ResourceKind::all() {
            let sql = format!(
                "SELECT EXISTS (SELECT 1 FROM {} WHERE store_id = $1)",
                table_name(*kind)
            );
            let occupied = sqlx::query_scalar::<_, bool>(sql.as_str())
                .bind(store_id.as_uuid())
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to check {} of store '{store_id}': {error}",
                        kind.plural()
                    ))
                })?;
            if occupied {
                return Ok(StoreDeleteOutcome::Blocked(*kind));
            }
        }

        let deleted = sqlx::query_as::<_, StoreRow>(
            r#"
            DELETE FROM stores
            WHERE id = $1
            RETURNING id, name, owner_subject, created_at, updated_at
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete store '{store_id}': {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(StoreDeleteOutcome::Deleted(deleted.into_store()?))
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;
    use vitrine_application::{StoreDeleteOutcome, StoreRepository};
    use vitrine_core::NonEmptyString;

    use super::PostgresStoreRepository;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for postgres store repository tests: {error}");
        }

        Some(pool)
    }

    fn name(value: &str) -> NonEmptyString {
        NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn stores_round_trip_and_keep_their_owner() {
        let Some(pool) = test_pool().await else {
            return;
        };

        let repository = PostgresStoreRepository::new(pool);
        let subject = format!("owner-{}", uuid::Uuid::new_v4());
        let created = repository
            .create_store(subject.as_str(), name("Main"))
            .await
            .unwrap_or_else(|error| panic!("create store failed: {error}"));

        let renamed = repository
            .rename_store(created.id(), name("Outlet"))
            .await
            .unwrap_or_else(|error| panic!("rename store failed: {error}"));
        assert_eq!(renamed.name().as_str(), "Outlet");
        assert!(renamed.is_owned_by(subject.as_str()));

        let listed = repository
            .list_stores_for_owner(subject.as_str())
            .await
            .unwrap_or_default();
        assert_eq!(listed.len(), 1);

        let deleted = repository.delete_empty_store(created.id()).await;
        assert!(matches!(deleted, Ok(StoreDeleteOutcome::Deleted(_))));
        assert!(matches!(repository.find_store(created.id()).await, Ok(None)));
    }
}
