//! PostgreSQL embedding repository with connection pooling

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::vector::{EmbeddingRepository, RowResult, RuleId, StoredEmbedding};
use crate::domain::DomainError;

/// Default table holding encoded rule embeddings
pub const DEFAULT_EMBEDDING_TABLE: &str = "business_rule_embeddings";

/// PostgreSQL repository configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
    /// Table holding the embeddings
    pub table_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/pr_risk".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            table_name: DEFAULT_EMBEDDING_TABLE.to_string(),
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }
}

/// PostgreSQL embedding repository
///
/// One row per rule: `(rule_id, dimension, provider, embedding BYTEA, created_at)`.
/// Saving an existing rule replaces its row.
pub struct PostgresEmbeddingRepository {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresEmbeddingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresEmbeddingRepository")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresEmbeddingRepository {
    /// Creates a repository over an existing pool
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Creates a repository with its own connection pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, config.table_name.clone()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the embeddings table and its provider index exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                rule_id VARCHAR(255) PRIMARY KEY,
                dimension INTEGER NOT NULL,
                provider VARCHAR(64) NOT NULL,
                embedding BYTEA NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{0}_provider ON {0} (provider)",
            self.table_name
        );

        sqlx::query(&create_index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }
}

fn row_to_embedding(row: &PgRow) -> Result<StoredEmbedding, DomainError> {
    let rule_id: String = row.get("rule_id");
    let dimension: i32 = row.get("dimension");
    let created_at: DateTime<Utc> = row.get("created_at");

    let dimension = usize::try_from(dimension).map_err(|_| {
        DomainError::corrupt_data(format!(
            "Negative dimension {} for rule '{}'",
            dimension, rule_id
        ))
    })?;

    Ok(StoredEmbedding {
        rule_id: RuleId::new(rule_id)?,
        dimension,
        provider: row.get("provider"),
        embedding: row.get("embedding"),
        created_at,
    })
}

#[async_trait]
impl EmbeddingRepository for PostgresEmbeddingRepository {
    async fn save(&self, row: StoredEmbedding) -> Result<(), DomainError> {
        let dimension = i32::try_from(row.dimension).map_err(|_| {
            DomainError::validation(format!("Dimension {} out of range", row.dimension))
        })?;

        let query = format!(
            r#"
            INSERT INTO {} (rule_id, dimension, provider, embedding, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (rule_id) DO UPDATE
            SET dimension = EXCLUDED.dimension,
                provider = EXCLUDED.provider,
                embedding = EXCLUDED.embedding,
                created_at = EXCLUDED.created_at
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(row.rule_id.as_str())
            .bind(dimension)
            .bind(&row.provider)
            .bind(&row.embedding)
            .bind(row.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to save embedding: {}", e)))?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<RowResult>, DomainError> {
        let query = format!(
            "SELECT rule_id, dimension, provider, embedding, created_at FROM {} ORDER BY created_at",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list embeddings: {}", e)))?;

        Ok(rows.iter().map(row_to_embedding).collect())
    }

    async fn find_by_id(&self, rule_id: &RuleId) -> Result<Option<StoredEmbedding>, DomainError> {
        let query = format!(
            "SELECT rule_id, dimension, provider, embedding, created_at FROM {} WHERE rule_id = $1",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(rule_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get embedding: {}", e)))?;

        result.as_ref().map(row_to_embedding).transpose()
    }

    async fn exists_by_id(&self, rule_id: &RuleId) -> Result<bool, DomainError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE rule_id = $1) as exists",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(rule_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check existence: {}", e)))?;

        let exists: bool = row.get("exists");
        Ok(exists)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count embeddings: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }
}
