pub mod book;
pub mod catalog;
pub mod sqlite;
pub mod store;

pub use book::{StickerBook, StickerBookView};
pub use catalog::{CatalogEntry, CATALOG};
pub use sqlite::SqliteStickerStore;
pub use store::{MemoryStickerStore, StickerStore};
