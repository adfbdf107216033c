mod message;
mod reference;

pub use message::{Message, Role};
pub use reference::{ContentReference, ContentType, ReferenceMeta};
