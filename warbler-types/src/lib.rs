pub mod forms;
pub mod models;

pub use forms::*;
pub use models::*;
