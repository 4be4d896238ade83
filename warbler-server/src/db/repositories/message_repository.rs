use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use warbler_types::{Message, TimelineMessage, DEFAULT_IMAGE_URL};

use super::parse_timestamp;
use crate::db::{DbPool, ModelError};

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: parse_timestamp(2, &row.get::<_, String>(2)?)?,
        user_id: row.get(3)?,
    })
}

pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a message for `user_id`, stamped now. An unknown user is an integrity error.
    pub fn create(&self, user_id: i64, text: &str) -> Result<Message, ModelError> {
        let conn = self.pool.get()?;
        let timestamp = Utc::now();

        conn.execute(
            "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![text, timestamp.to_rfc3339(), user_id],
        )?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            text: text.to_string(),
            timestamp,
            user_id,
        })
    }

    pub fn get_by_id(&self, message_id: i64) -> Result<Option<Message>> {
        let conn = self.pool.get()?;
        let message = conn
            .query_row(
                "SELECT id, text, timestamp, user_id FROM messages WHERE id = ?",
                [message_id],
                map_message,
            )
            .optional()
            .context("Failed to load message")?;
        Ok(message)
    }

    pub fn delete(&self, message_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute("DELETE FROM messages WHERE id = ?", [message_id])
            .context("Failed to delete message")?;
        Ok(rows)
    }

    /// A user's messages, newest first
    pub fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, timestamp, user_id
             FROM messages
             WHERE user_id = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )?;

        let messages = stmt
            .query_map([user_id, limit], map_message)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    pub fn count_by_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Messages by `user_id` and everyone they follow, newest first
    pub fn timeline(&self, user_id: i64, limit: i64) -> Result<Vec<TimelineMessage>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
             FROM messages m
             JOIN users u ON u.id = m.user_id
             WHERE m.user_id = ?1
                OR m.user_id IN (
                    SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                )
             ORDER BY m.timestamp DESC, m.id DESC
             LIMIT ?2",
        )?;

        let messages = stmt
            .query_map([user_id, limit], |row| {
                Ok(TimelineMessage {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    timestamp: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                    user_id: row.get(3)?,
                    username: row.get(4)?,
                    image_url: row
                        .get::<_, Option<String>>(5)?
                        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{FollowRepository, NewUser, UserRepository};
    use crate::db::Database;

    fn setup_test_db() -> (Database, MessageRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let repo = MessageRepository::new(db.pool.clone());
        (db, repo)
    }

    fn add_user(db: &Database, username: &str) -> i64 {
        UserRepository::new(db.pool.clone())
            .insert(&NewUser {
                username: Some(username.to_string()),
                email: Some(format!("{username}@test.com")),
                password: "$argon2id$placeholder".to_string(),
                image_url: DEFAULT_IMAGE_URL.to_string(),
            })
            .expect("Failed to insert user")
            .id
    }

    #[test]
    fn test_create_and_get_message() {
        let (db, repo) = setup_test_db();
        let user_id = add_user(&db, "testuser");

        let message = repo.create(user_id, "Test message").unwrap();
        assert_eq!(repo.count().unwrap(), 1);

        let stored = repo.get_by_id(message.id).unwrap().expect("message");
        assert_eq!(stored.text, "Test message");
        assert_eq!(stored.user_id, user_id);
    }

    #[test]
    fn test_message_requires_existing_user() {
        let (_db, repo) = setup_test_db();
        let err = repo.create(94566, "nobody wrote this").unwrap_err();
        assert!(err.is_integrity(), "got {err:?}");
    }

    #[test]
    fn test_message_longer_than_limit_rejected_by_schema() {
        let (db, repo) = setup_test_db();
        let user_id = add_user(&db, "testuser");
        let err = repo.create(user_id, &"x".repeat(141)).unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn test_list_by_user_newest_first() {
        let (db, repo) = setup_test_db();
        let user_id = add_user(&db, "testuser");
        let other_id = add_user(&db, "other");

        let first = repo.create(user_id, "first").unwrap();
        let second = repo.create(user_id, "second").unwrap();
        repo.create(other_id, "not mine").unwrap();

        let messages = repo.list_by_user(user_id, 100).unwrap();
        let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(repo.count_by_user(user_id).unwrap(), 2);
    }

    #[test]
    fn test_delete_message() {
        let (db, repo) = setup_test_db();
        let user_id = add_user(&db, "testuser");
        let message = repo.create(user_id, "bye").unwrap();

        assert_eq!(repo.delete(message.id).unwrap(), 1);
        assert!(repo.get_by_id(message.id).unwrap().is_none());
    }

    #[test]
    fn test_deleting_user_cascades_to_messages() {
        let (db, repo) = setup_test_db();
        let user_id = add_user(&db, "testuser");
        repo.create(user_id, "soon gone").unwrap();

        UserRepository::new(db.pool.clone()).delete(user_id).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_timeline_includes_self_and_followed_only() {
        let (db, repo) = setup_test_db();
        let me = add_user(&db, "me");
        let friend = add_user(&db, "friend");
        let stranger = add_user(&db, "stranger");

        FollowRepository::new(db.pool.clone()).follow(me, friend).unwrap();

        repo.create(me, "mine").unwrap();
        repo.create(friend, "friend's").unwrap();
        repo.create(stranger, "stranger's").unwrap();

        let timeline = repo.timeline(me, 100).unwrap();
        let texts: Vec<&str> = timeline.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["friend's", "mine"]);
        assert_eq!(timeline[0].username, "friend");
    }
}
