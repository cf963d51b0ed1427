//! Storage implementations for the harvester.
//!
//! Available backends:
//! - `JsonFileStore` - JSON files in an output directory (production)
//! - `MemoryStore` - In-memory storage with failure injection (tests)

pub mod json;
pub mod memory;

pub use json::{JsonFileStore, COMMENTARY_FILE, DISCOVERY_FILE};
pub use memory::MemoryStore;
