// src/stats/mod.rs

pub mod aggregate;
pub mod popular;
pub mod recommend;
