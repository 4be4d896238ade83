// Library exports for warbler-server
// The binary, the migrate tool and the integration tests all build on these

pub mod accounts;
pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod middleware;
pub mod password;
pub mod seed;
pub mod session;
pub mod state;
