pub mod auth;
pub mod error;
pub mod home;
pub mod messages;
pub mod users;

pub use error::{ApiError, ApiResult};
