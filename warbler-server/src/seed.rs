use anyhow::{Context, Result};

use crate::accounts::AccountService;
use crate::db::repositories::{
    FollowRepository, LikeRepository, MessageRepository, ProfileUpdate, UserRepository,
};
use crate::db::Database;

/// Password every demo account is created with
pub const DEMO_PASSWORD: &str = "password";

const DEMO_USERS: [(&str, &str); 4] = [
    ("alice", "Rust enthusiast, bird watcher"),
    ("bob", "Writes SQL for fun"),
    ("charlie", "Mostly here for the birds"),
    ("diana", "Open source maintainer"),
];

const DEMO_MESSAGES: [(usize, &str); 8] = [
    (0, "First warble! Hello everyone."),
    (0, "Spotted a kingfisher by the river this morning."),
    (1, "SELECT * FROM birds WHERE song = 'lovely';"),
    (1, "Indexes are a love language."),
    (2, "Do pigeons count as birds? Asking for a friend."),
    (2, "Feeder is up. Waiting for visitors."),
    (3, "Shipped a release today, time for a walk."),
    (3, "Reviewing pull requests with a cup of tea."),
];

/// (follower, followed) as indexes into DEMO_USERS
const DEMO_FOLLOWS: [(usize, usize); 5] = [(0, 1), (0, 2), (1, 0), (2, 3), (3, 0)];

/// (user, message) as indexes into DEMO_USERS and DEMO_MESSAGES
const DEMO_LIKES: [(usize, usize); 4] = [(1, 0), (2, 1), (0, 2), (3, 4)];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub messages: usize,
    pub follows: usize,
    pub likes: usize,
}

/// Fill an empty database with demo accounts, messages, follows and likes.
///
/// Does nothing when any user already exists.
pub fn seed_demo_data(db: &Database) -> Result<SeedSummary> {
    let pool = db.pool.clone();
    let users = UserRepository::new(pool.clone());
    if users.count()? > 0 {
        tracing::debug!("Database already has users, skipping demo data");
        return Ok(SeedSummary::default());
    }

    let accounts = AccountService::new(pool.clone());
    let messages = MessageRepository::new(pool.clone());
    let follows = FollowRepository::new(pool.clone());
    let likes = LikeRepository::new(pool);

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (username, bio) in DEMO_USERS {
        let user = accounts
            .register(
                Some(username),
                Some(&format!("{username}@warbler.test")),
                Some(DEMO_PASSWORD),
                None,
            )
            .with_context(|| format!("Failed to create demo user {username}"))?;
        users
            .update_profile(
                user.id,
                &ProfileUpdate {
                    bio: Some(bio.to_string()),
                    ..Default::default()
                },
            )
            .with_context(|| format!("Failed to set bio for {username}"))?;
        user_ids.push(user.id);
    }

    let mut message_ids = Vec::with_capacity(DEMO_MESSAGES.len());
    for (author, text) in DEMO_MESSAGES {
        let message = messages
            .create(user_ids[author], text)
            .context("Failed to create demo message")?;
        message_ids.push(message.id);
    }

    for (follower, followed) in DEMO_FOLLOWS {
        follows.follow(user_ids[follower], user_ids[followed])?;
    }

    for (user, message) in DEMO_LIKES {
        likes.toggle(user_ids[user], message_ids[message])?;
    }

    let summary = SeedSummary {
        users: user_ids.len(),
        messages: message_ids.len(),
        follows: DEMO_FOLLOWS.len(),
        likes: DEMO_LIKES.len(),
    };
    tracing::info!("Seeded demo data: {:?}", summary);
    Ok(summary)
}
