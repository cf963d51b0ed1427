pub mod event;
pub mod identity;
pub mod record;

pub use event::{Category, Classification, DiscoveredEvent, RawEvent};
pub use identity::{Identity, IdentityStrategy};
pub use record::{CommentaryRecord, Payload, RawRecord};
