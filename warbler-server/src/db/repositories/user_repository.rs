use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use warbler_types::{User, DEFAULT_IMAGE_URL};

use super::parse_timestamp;
use crate::db::{DbPool, ModelError};

const USER_COLUMNS: &str =
    "id, username, email, password, image_url, header_image_url, bio, location, join_date";

/// A user that has passed signup validation but is not stored yet.
///
/// Username and email stay optional: the database, not the constructor,
/// is what rejects a missing value.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Already hashed
    pub password: String,
    pub image_url: String,
}

/// Field changes for an existing user. `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub(super) fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        image_url: row
            .get::<_, Option<String>>(4)?
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        header_image_url: row.get(5)?,
        bio: row.get(6)?,
        location: row.get(7)?,
        join_date: parse_timestamp(8, &row.get::<_, String>(8)?)?,
    })
}

/// Make `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'` pattern
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Persist a signed-up user and return it with its new id
    pub fn insert(&self, new_user: &NewUser) -> Result<User, ModelError> {
        let conn = self.pool.get()?;
        let join_date = Utc::now();

        conn.execute(
            "INSERT INTO users (username, email, password, image_url, join_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                new_user.username,
                new_user.email,
                new_user.password,
                new_user.image_url,
                join_date.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::debug!("Inserted user {}", id);

        Ok(User {
            id,
            username: new_user.username.clone().unwrap_or_default(),
            email: new_user.email.clone().unwrap_or_default(),
            password: new_user.password.clone(),
            image_url: new_user.image_url.clone(),
            header_image_url: None,
            bio: None,
            location: None,
            join_date,
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [user_id],
                map_user_row,
            )
            .optional()
            .context("Failed to load user")?;
        Ok(user)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                [username],
                map_user_row,
            )
            .optional()
            .context("Failed to load user")?;
        Ok(user)
    }

    /// All users, or those whose username contains `search`
    pub fn search(&self, search: Option<&str>) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let pattern = format!("%{}%", escape_like(search.unwrap_or("").trim()));
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username LIKE ? ESCAPE '\\' ORDER BY username"
        ))?;

        let users = stmt
            .query_map([pattern], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Apply a profile edit; renaming onto a taken username or email is an integrity error
    pub fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<(), ModelError> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET
                username = COALESCE(?1, username),
                email = COALESCE(?2, email),
                image_url = COALESCE(?3, image_url),
                header_image_url = COALESCE(?4, header_image_url),
                bio = COALESCE(?5, bio),
                location = COALESCE(?6, location)
             WHERE id = ?7",
            rusqlite::params![
                update.username,
                update.email,
                update.image_url,
                update.header_image_url,
                update.bio,
                update.location,
                user_id,
            ],
        )?;
        Ok(())
    }

    /// Delete a user; messages, follows, likes and sessions go with it
    pub fn delete(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute("DELETE FROM users WHERE id = ?", [user_id])
            .context("Failed to delete user")?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
