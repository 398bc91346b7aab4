// src/handlers/mod.rs

pub mod root;
pub mod texts;
