use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ArchetypeStore {
    pool: SqlitePool,
}

/// A named card archetype.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Archetype {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ArchetypeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an archetype. Returns the new id. Fails on duplicate names.
    pub async fn create(&self, name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO archetypes (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get an archetype by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Archetype>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, created_at, updated_at FROM archetypes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get an archetype by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Archetype>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, created_at, updated_at FROM archetypes WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// List all archetypes.
    pub async fn list_all(&self) -> Result<Vec<Archetype>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, created_at, updated_at FROM archetypes ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }
}
