// src/models/mod.rs

pub mod submission;
