// src/core/mod.rs

pub mod classifier;
pub mod defaults;
pub mod engine;
pub mod normalizer;
pub mod tokenizer;
pub mod types;
pub mod vocabulary;
