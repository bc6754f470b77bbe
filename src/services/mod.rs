// src/services/mod.rs

pub mod quizgen;
