pub mod auth;
pub mod id;
pub mod partition;
