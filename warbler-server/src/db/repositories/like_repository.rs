use anyhow::{Context, Result};

use warbler_types::Message;

use super::parse_timestamp;
use crate::db::DbPool;

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Like the message if it isn't liked yet, otherwise remove the like.
    ///
    /// Returns whether the message is liked afterwards.
    pub fn toggle(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let tx = conn
            .unchecked_transaction()
            .context("Failed to start like transaction")?;

        let removed = tx
            .execute(
                "DELETE FROM likes WHERE user_id = ? AND message_id = ?",
                [user_id, message_id],
            )
            .context("Failed to remove like")?;
        if removed == 0 {
            tx.execute(
                "INSERT OR IGNORE INTO likes (user_id, message_id) VALUES (?, ?)",
                [user_id, message_id],
            )
            .context("Failed to add like")?;
        }

        tx.commit().context("Failed to commit like")?;
        Ok(removed == 0)
    }

    pub fn is_liked(&self, user_id: i64, message_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND message_id = ?",
            [user_id, message_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Ids of every message `user_id` has liked
    pub fn liked_message_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ? ORDER BY id")?;
        let ids = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Messages `user_id` has liked, most recently liked first
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<Message>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.text, m.timestamp, m.user_id
             FROM likes l
             JOIN messages m ON m.id = l.message_id
             WHERE l.user_id = ?
             ORDER BY l.id DESC",
        )?;

        let messages = stmt
            .query_map([user_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    timestamp: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                    user_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    pub fn count_for_message(&self, message_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE message_id = ?",
            [message_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn count_by_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
