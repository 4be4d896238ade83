pub mod connection;
pub mod error;
pub mod repositories;
pub mod schema;

pub use connection::{Database, DbConnection, DbPool};
pub use error::ModelError;
