pub mod media;
pub mod planned;
pub mod watched;
pub mod watching;

pub use media::{now_millis, Collection, ItemKey, MediaType, ParseMediaTypeError};
pub use planned::PlannedItem;
pub use watched::WatchedItem;
pub use watching::WatchingItem;
