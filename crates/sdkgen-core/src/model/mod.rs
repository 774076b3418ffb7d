pub mod definition;
pub mod document;
pub mod path;

pub use definition::*;
pub use document::{Document, DocumentMeta};
pub use path::{HttpVerb, Path};
