use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// Full user row. The password hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub admin: bool,
    pub superadmin: bool,
    pub victories: i64,
    pub defeats: i64,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    admin: i32,
    superadmin: i32,
    victories: i64,
    defeats: i64,
    profile_picture: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            admin: row.admin != 0,
            superadmin: row.superadmin != 0,
            victories: row.victories,
            defeats: row.defeats,
            profile_picture: row.profile_picture,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Listing entry for the public user index.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub victories: i64,
    pub defeats: i64,
}

/// Public profile returned for a single user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub profile_picture: Option<String>,
    pub victories: i64,
    pub defeats: i64,
}

const USER_COLUMNS: &str = "id, username, email, password, admin, superadmin, \
     victories, defeats, profile_picture, created_at, updated_at";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Returns the new user id.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        profile_picture: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, profile_picture) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(profile_picture)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Liveness check for the token verifier: does the subject still exist?
    /// One read per gated request; distinguishes not-found from query error.
    pub async fn exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row: (i32,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 != 0)
    }

    /// Check whether a username or email is already registered.
    pub async fn credential_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? OR email = ?)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 != 0)
    }

    /// Update username, email and profile picture.
    pub async fn update_profile(
        &self,
        id: i64,
        username: &str,
        email: &str,
        profile_picture: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, profile_picture = ?, \
             updated_at = datetime('now') WHERE id = ?",
        )
        .bind(username)
        .bind(email)
        .bind(profile_picture)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored password hash.
    pub async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the admin flag.
    pub async fn set_admin(&self, id: i64, admin: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET admin = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(admin as i32)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Promote a user to superadmin (implies admin). Used by the CLI bootstrap.
    pub async fn make_superadmin(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET admin = 1, superadmin = 1, updated_at = datetime('now') \
             WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by id. Deletion acts as instant token revocation:
    /// the verifier's liveness check fails on the next request.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all users with public attributes only.
    pub async fn list_public(&self) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, victories, defeats FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// List full user rows (admin debug endpoint).
    pub async fn list_all(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Public profile for a single user.
    pub async fn profile(&self, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, username, profile_picture, victories, defeats FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
