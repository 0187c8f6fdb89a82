//! Postgres-backed currency registry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};
use uuid::Uuid;

use coinrate_common::{
    Currency, CurrencyCode, CurrencyId, CurrencyKind, NewCurrency, RegistryError, Result,
};

use crate::CurrencyRegistry;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS currencies (
    id           UUID PRIMARY KEY,
    name         TEXT NOT NULL,
    code         TEXT NOT NULL UNIQUE,
    "type"       INTEGER NOT NULL,
    is_available BOOLEAN NOT NULL
)"#;

const SELECT_ALL: &str = r#"SELECT id, name, code, "type", is_available FROM currencies"#;

const SELECT_ONE: &str =
    r#"SELECT id, name, code, "type", is_available FROM currencies WHERE id = $1"#;

const INSERT: &str =
    r#"INSERT INTO currencies (id, name, code, "type", is_available) VALUES ($1, $2, $3, $4, $5)"#;

const UPDATE: &str =
    r#"UPDATE currencies SET name = $2, code = $3, "type" = $4, is_available = $5 WHERE id = $1"#;

const DELETE: &str = "DELETE FROM currencies WHERE id = $1";

/// Row layout of the `currencies` table.
#[derive(Debug, Clone, FromRow)]
struct CurrencyRow {
    id: Uuid,
    name: String,
    code: String,
    #[sqlx(rename = "type")]
    kind: i32,
    is_available: bool,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = RegistryError;

    fn try_from(row: CurrencyRow) -> Result<Self> {
        Ok(Currency {
            id: CurrencyId::from_uuid(row.id),
            name: row.name,
            code: CurrencyCode::new(row.code),
            kind: CurrencyKind::try_from(row.kind)?,
            available: row.is_available,
        })
    }
}

/// Registry stored in Postgres.
pub struct PgRegistry {
    pool: PgPool,
    /// Upper bound on every statement.
    timeout: Duration,
}

impl PgRegistry {
    /// Create a registry on top of an existing pool.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Connect to the database and verify the connection.
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .map_err(storage_error)?;

        info!("Connected to Postgres currency registry");
        Ok(Self::new(pool, timeout))
    }

    /// Create the `currencies` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.bounded(sqlx::query(CREATE_TABLE).execute(&self.pool))
            .await?;
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        self.bounded_with(fut, storage_error).await
    }

    /// Like `bounded`, with a caller-supplied mapping for database errors.
    async fn bounded_with<T, F, M>(&self, fut: F, map_err: M) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
        M: FnOnce(sqlx::Error) -> RegistryError,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(map_err),
            Err(_) => Err(RegistryError::Storage(format!(
                "query timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

fn storage_error(e: sqlx::Error) -> RegistryError {
    RegistryError::Storage(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// A write that collides on `code` is reported as a duplicate, anything else as storage.
fn unique_or_storage(e: sqlx::Error, code: &CurrencyCode) -> RegistryError {
    if is_unique_violation(&e) {
        RegistryError::AlreadyExists(code.to_string())
    } else {
        storage_error(e)
    }
}

#[async_trait]
impl CurrencyRegistry for PgRegistry {
    async fn list_currencies(&self) -> Result<Vec<Currency>> {
        let rows = self
            .bounded(sqlx::query_as::<_, CurrencyRow>(SELECT_ALL).fetch_all(&self.pool))
            .await?;

        rows.into_iter().map(Currency::try_from).collect()
    }

    async fn get_currency(&self, id: CurrencyId) -> Result<Currency> {
        let row = self
            .bounded(
                sqlx::query_as::<_, CurrencyRow>(SELECT_ONE)
                    .bind(*id.as_uuid())
                    .fetch_optional(&self.pool),
            )
            .await?
            .ok_or(RegistryError::NotFound(id))?;

        Currency::try_from(row)
    }

    async fn create_currency(&self, currency: NewCurrency) -> Result<Currency> {
        let currency = currency.into_currency(CurrencyId::new());

        let insert = sqlx::query(INSERT)
            .bind(*currency.id.as_uuid())
            .bind(&currency.name)
            .bind(currency.code.as_str())
            .bind(currency.kind.code())
            .bind(currency.available)
            .execute(&self.pool);

        self.bounded_with(insert, |e| unique_or_storage(e, &currency.code))
            .await?;

        debug!(id = %currency.id, code = %currency.code, "Currency created");
        Ok(currency)
    }

    async fn update_currency(&self, currency: Currency) -> Result<()> {
        let update = sqlx::query(UPDATE)
            .bind(*currency.id.as_uuid())
            .bind(&currency.name)
            .bind(currency.code.as_str())
            .bind(currency.kind.code())
            .bind(currency.available)
            .execute(&self.pool);

        let done = self
            .bounded_with(update, |e| unique_or_storage(e, &currency.code))
            .await?;

        if done.rows_affected() == 0 {
            return Err(RegistryError::NotFound(currency.id));
        }

        debug!(id = %currency.id, code = %currency.code, "Currency updated");
        Ok(())
    }

    async fn delete_currency(&self, id: CurrencyId) -> Result<()> {
        let done = self
            .bounded(sqlx::query(DELETE).bind(*id.as_uuid()).execute(&self.pool))
            .await?;

        if done.rows_affected() == 0 {
            return Err(RegistryError::NotFound(id));
        }

        debug!(id = %id, "Currency deleted");
        Ok(())
    }
}
