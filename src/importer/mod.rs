// file: src/importer/mod.rs
// description: importer module exports
// reference: internal module structure

pub mod bulk;

pub use bulk::{CsvBatch, CsvImporter, ImportSummary, RowError, import_batch};
