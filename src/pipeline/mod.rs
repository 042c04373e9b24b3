// src/pipeline/mod.rs

pub mod format;
pub mod normalize;
pub mod readers;
pub mod sentiment;
pub mod writers;

pub use format::{read_dataset, write_dataset, TabularFormat};
