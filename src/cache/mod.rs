// src/cache/mod.rs

pub mod token_cache;

pub use token_cache::TokenCache;
