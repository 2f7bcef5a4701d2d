mod item;
#[cfg(feature = "http")]
pub mod providers;
mod source;
mod tab;

pub use item::{InventoryItem, ItemProperty, Socket, FRAME_GEM, FRAME_RELIC, FRAME_UNIQUE};
pub use source::StashSource;
pub use tab::{StashTab, TabDescriptor, TabItems, TabList, TabScope};
