// file: src/extractor/mod.rs
// description: indicator extraction module exports
// reference: internal module structure

pub mod ioc;
pub mod patterns;

pub use ioc::{IocExtractor, extract_iocs};
