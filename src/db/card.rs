use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct CardStore {
    pool: SqlitePool,
}

/// A card with its archetype references resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub card_type: String,
    /// Monster/spell sub-types
    pub type_list: Vec<String>,
    pub effect: String,
    pub image: String,
    /// Copies allowed per deck; 0 means unrestricted
    pub limited: i64,
    pub archetypes: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: i64,
    name: String,
    description: String,
    card_type: String,
    type_list: String,
    effect: String,
    image: String,
    limited: i64,
    created_at: String,
    updated_at: String,
}

impl CardRow {
    fn into_card(self, archetypes: Vec<i64>) -> Card {
        // type_list is stored as a JSON array; a corrupt value decays to empty
        let type_list = serde_json::from_str(&self.type_list).unwrap_or_default();
        Card {
            id: self.id,
            name: self.name,
            description: self.description,
            card_type: self.card_type,
            type_list,
            effect: self.effect,
            image: self.image,
            limited: self.limited,
            archetypes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl CardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a card. Returns the new id. Fails on duplicate names.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        card_type: &str,
        type_list: &[String],
        effect: &str,
        image: &str,
        limited: i64,
    ) -> Result<i64, sqlx::Error> {
        let type_json =
            serde_json::to_string(type_list).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let result = sqlx::query(
            "INSERT INTO cards (name, description, card_type, type_list, effect, image, limited) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(card_type)
        .bind(type_json)
        .bind(effect)
        .bind(image)
        .bind(limited)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Associate a card with an archetype.
    pub async fn add_archetype(
        &self,
        card_id: i64,
        archetype_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO card_archetypes (card_id, archetype_id) VALUES (?, ?)")
            .bind(card_id)
            .bind(archetype_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List all cards with their archetype ids (admin debug endpoint).
    pub async fn list_all(&self) -> Result<Vec<Card>, sqlx::Error> {
        let rows: Vec<CardRow> = sqlx::query_as(
            "SELECT id, name, description, card_type, type_list, effect, image, limited, \
             created_at, updated_at FROM cards ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let links: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT card_id, archetype_id FROM card_archetypes ORDER BY card_id, archetype_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let archetypes = links
                    .iter()
                    .filter(|(card_id, _)| *card_id == row.id)
                    .map(|(_, archetype_id)| *archetype_id)
                    .collect();
                row.into_card(archetypes)
            })
            .collect())
    }
}
