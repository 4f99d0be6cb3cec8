pub mod completion;
pub mod inspection;
pub mod property;
pub mod suggest;

pub use completion::CompletionSearch;
pub use inspection::{KeyStatus, check_key, closest_properties};
pub use property::PropertyView;
pub use suggest::{KeySuggestion, suggest_keys, suggest_values};
