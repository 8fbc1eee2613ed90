// src/handlers/mod.rs

pub mod admin;
pub mod answers;
pub mod health;
