pub mod auth;
pub mod error;
pub mod middleware;
pub mod server;
pub mod users;
pub mod validation;
