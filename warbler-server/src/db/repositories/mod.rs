mod follow_repository;
mod like_repository;
mod message_repository;
mod user_repository;

pub use follow_repository::FollowRepository;
pub use like_repository::LikeRepository;
pub use message_repository::MessageRepository;
pub use user_repository::{NewUser, ProfileUpdate, UserRepository};

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 column, reporting bad data as a conversion failure on `idx`.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    value.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
