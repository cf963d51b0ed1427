//! Event discoverer implementations.
//!
//! - `CricinfoDiscoverer` - ESPNcricinfo live scores page
//! - `MockDiscoverer` - For testing

mod cricinfo;
mod mock;

pub use cricinfo::CricinfoDiscoverer;
pub use mock::MockDiscoverer;
