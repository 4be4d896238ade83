use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar used when a user signs up without an image.
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// Longest message body accepted, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 140;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip)]
    pub password: String,
    pub image_url: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "datetime_format")]
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

/// A message joined with the author fields a timeline needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineMessage {
    pub id: i64,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub message: Message,
    pub user: User,
    pub like_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub message_count: usize,
    pub following_count: usize,
    pub follower_count: usize,
    pub like_count: usize,
    pub messages: Vec<Message>,
}

/// A user together with a list of related users (following or followers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub user: User,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikedMessages {
    pub user: User,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    pub user: Option<User>,
    pub messages: Vec<TimelineMessage>,
    #[serde(default)]
    pub liked_message_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
