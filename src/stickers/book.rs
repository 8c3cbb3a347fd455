//! Read model behind the sticker collection view.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::db::Sticker;

use super::store::StickerStore;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StickerBookView {
    pub stickers: Vec<Sticker>,
    pub count: usize,
}

/// Live view over a `StickerStore`, newest sticker first.
#[derive(Clone)]
pub struct StickerBook {
    rx: watch::Receiver<Vec<Sticker>>,
}

impl StickerBook {
    pub fn new(store: &Arc<dyn StickerStore>) -> Self {
        Self {
            rx: store.subscribe(),
        }
    }

    pub fn view(&self) -> StickerBookView {
        let stickers = self.rx.borrow().clone();
        StickerBookView {
            count: stickers.len(),
            stickers,
        }
    }

    /// Waits until the store publishes a new collection.
    pub async fn changed(&mut self) -> Option<StickerBookView> {
        self.rx.changed().await.ok()?;
        let stickers = self.rx.borrow_and_update().clone();
        Some(StickerBookView {
            count: stickers.len(),
            stickers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stickers::MemoryStickerStore;

    #[tokio::test]
    async fn view_follows_the_store() {
        let store: Arc<dyn StickerStore> = Arc::new(MemoryStickerStore::new());
        let mut book = StickerBook::new(&store);
        assert_eq!(book.view().count, 0);

        let first = store.add(Sticker::unsaved("🎮", "Gaming", 1)).await.unwrap();
        let view = book.changed().await.unwrap();
        assert_eq!(view.stickers, vec![first.clone()]);

        let second = store.add(Sticker::unsaved("🎨", "Art", 2)).await.unwrap();
        let view = book.changed().await.unwrap();
        assert_eq!(view.count, 2);
        assert_eq!(view.stickers, vec![second, first]);
    }
}
