pub mod metadata;
pub mod name;
pub mod raw;
pub mod source;

pub use metadata::*;
pub use name::{CanonicalName, INDEX_PLACEHOLDER, NameForm};
pub use raw::*;
pub use source::*;
