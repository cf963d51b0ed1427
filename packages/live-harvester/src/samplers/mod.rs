//! Feed sampler implementations, one per feed shape.
//!
//! - `PageTextSampler` - text lines of the rendered match page
//! - `StructuredApiSampler` - JSON commentary API
//! - `MockSampler` - For testing

mod api;
mod mock;
mod page_text;

pub use api::{records_at, StructuredApiSampler};
pub use mock::MockSampler;
pub use page_text::PageTextSampler;
