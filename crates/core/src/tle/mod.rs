//! Two-Line Element records and the tolerant text parser that produces them.

mod parser;
mod types;

pub use parser::{extract_catalog_id, parse_elements, ElementParser};
pub use types::{OrbitalElementRecord, StoredElementRecord};
