use anyhow::{Context, Result};

use warbler_types::User;

use super::user_repository::map_user_row;
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if `follower_id` is following `followed_id`
    pub fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_following_id = ? AND user_being_followed_id = ?",
            [follower_id, followed_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Follow a user. Following twice is a no-op.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id) VALUES (?, ?)",
            [followed_id, follower_id],
        )
        .context("Failed to follow user")?;
        Ok(())
    }

    /// Unfollow a user
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM follows WHERE user_following_id = ? AND user_being_followed_id = ?",
                [follower_id, followed_id],
            )
            .context("Failed to unfollow user")?;
        Ok(rows_affected)
    }

    /// Users that `user_id` follows
    pub fn following(&self, user_id: i64) -> Result<Vec<User>> {
        self.related_users(
            "SELECT u.id, u.username, u.email, u.password, u.image_url, u.header_image_url,
                    u.bio, u.location, u.join_date
             FROM follows f
             JOIN users u ON u.id = f.user_being_followed_id
             WHERE f.user_following_id = ?
             ORDER BY u.username",
            user_id,
        )
    }

    /// Users that follow `user_id`
    pub fn followers(&self, user_id: i64) -> Result<Vec<User>> {
        self.related_users(
            "SELECT u.id, u.username, u.email, u.password, u.image_url, u.header_image_url,
                    u.bio, u.location, u.join_date
             FROM follows f
             JOIN users u ON u.id = f.user_following_id
             WHERE f.user_being_followed_id = ?
             ORDER BY u.username",
            user_id,
        )
    }

    fn related_users(&self, sql: &str, user_id: i64) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map([user_id], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Get follower count
    pub fn follower_count(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get following count
    pub fn following_count(&self, user_id: i64) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_following_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{NewUser, UserRepository};
    use crate::db::Database;

    fn setup_test_db() -> (Database, FollowRepository, Vec<i64>) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");

        let users = UserRepository::new(db.pool.clone());
        let ids = ["alice", "bob", "charlie"]
            .iter()
            .map(|name| {
                users
                    .insert(&NewUser {
                        username: Some(name.to_string()),
                        email: Some(format!("{name}@test.com")),
                        password: "$argon2id$placeholder".to_string(),
                        image_url: warbler_types::DEFAULT_IMAGE_URL.to_string(),
                    })
                    .expect("Failed to insert user")
                    .id
            })
            .collect();

        let repo = FollowRepository::new(db.pool.clone());
        (db, repo, ids)
    }

    #[test]
    fn test_follow_is_one_way() {
        let (_db, repo, ids) = setup_test_db();
        let (alice, bob) = (ids[0], ids[1]);

        repo.follow(alice, bob).unwrap();
        assert!(repo.is_following(alice, bob).unwrap());
        assert!(!repo.is_following(bob, alice).unwrap());
    }

    #[test]
    fn test_follow_twice_is_noop() {
        let (_db, repo, ids) = setup_test_db();
        repo.follow(ids[0], ids[1]).unwrap();
        repo.follow(ids[0], ids[1]).unwrap();
        assert_eq!(repo.following_count(ids[0]).unwrap(), 1);
    }

    #[test]
    fn test_following_and_followers_lists() {
        let (_db, repo, ids) = setup_test_db();
        let (alice, bob, charlie) = (ids[0], ids[1], ids[2]);

        repo.follow(alice, bob).unwrap();
        repo.follow(alice, charlie).unwrap();
        repo.follow(charlie, bob).unwrap();

        let following: Vec<String> = repo
            .following(alice)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(following, vec!["bob", "charlie"]);

        let followers: Vec<String> = repo
            .followers(bob)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(followers, vec!["alice", "charlie"]);

        assert_eq!(repo.follower_count(bob).unwrap(), 2);
        assert_eq!(repo.following_count(alice).unwrap(), 2);
    }

    #[test]
    fn test_unfollow() {
        let (_db, repo, ids) = setup_test_db();
        repo.follow(ids[0], ids[1]).unwrap();

        assert_eq!(repo.unfollow(ids[0], ids[1]).unwrap(), 1);
        assert!(!repo.is_following(ids[0], ids[1]).unwrap());
        assert_eq!(repo.unfollow(ids[0], ids[1]).unwrap(), 0);
    }

    #[test]
    fn test_follow_unknown_user_fails() {
        let (_db, repo, ids) = setup_test_db();
        assert!(repo.follow(ids[0], 9999).is_err());
    }
}
