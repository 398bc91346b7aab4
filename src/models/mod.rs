// src/models/mod.rs

pub mod text;
