use super::store::{RecordCursor, RecordStoreError, UploadStore};
use chrono::{DateTime, Utc};
use clipshare_core::models::{FileEntry, UploadRecord};
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[derive(sqlx::FromRow)]
struct UploadRow {
    id: Uuid,
    code: String,
    files: Json<Vec<FileEntry>>,
    created_at: DateTime<Utc>,
}

impl From<UploadRow> for UploadRecord {
    fn from(row: UploadRow) -> Self {
        UploadRecord {
            id: row.id,
            code: row.code,
            files: row.files.0,
            created_at: row.created_at,
        }
    }
}

/// Upload records in the `uploads` table
#[derive(Clone)]
pub struct PostgresUploadStore {
    pool: PgPool,
}

impl PostgresUploadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl UploadStore for PostgresUploadStore {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "uploads",
        db.operation = "insert",
        code = %record.code
    ))]
    async fn insert(&self, record: &UploadRecord) -> Result<(), RecordStoreError> {
        // Use dynamic SQLx queries to avoid requiring DATABASE_URL/sqlx prepare
        let result = sqlx::query(
            r#"
            INSERT INTO uploads (id, code, files, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.code)
        .bind(Json(&record.files))
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RecordStoreError::CodeConflict(record.code.clone()))
            }
            Err(e) => {
                tracing::error!(error = ?e, code = %record.code, "Failed to insert upload record");
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self), fields(db.system = "postgresql", db.table = "uploads", db.operation = "select"))]
    async fn find_by_code(&self, code: &str) -> Result<Option<UploadRecord>, RecordStoreError> {
        let row = sqlx::query_as::<_, UploadRow>(
            r#"
            SELECT id, code, files, created_at
            FROM uploads
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UploadRecord::from))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, RecordStoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM uploads WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.system = "postgresql", db.table = "uploads", db.operation = "select"))]
    async fn find_older_than(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<RecordCursor>,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, RecordStoreError> {
        let rows = sqlx::query_as::<_, UploadRow>(
            r#"
            SELECT id, code, files, created_at
            FROM uploads
            WHERE created_at < $1
              AND ($2::timestamptz IS NULL OR (created_at, id) > ($2, $3::uuid))
            ORDER BY created_at, id
            LIMIT $4
            "#,
        )
        .bind(cutoff)
        .bind(after.map(|c| c.created_at))
        .bind(after.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UploadRecord::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.system = "postgresql", db.table = "uploads", db.operation = "delete"))]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RecordStoreError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RecordStoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
