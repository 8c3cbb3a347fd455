pub mod sticker;

pub use sticker::{sort_newest_first, Sticker};
