use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::watch;

use crate::db::{Database, Sticker};

use super::store::StickerStore;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// `StickerStore` backed by the `stickers` table.
pub struct SqliteStickerStore {
    db: Database,
    tx: watch::Sender<Vec<Sticker>>,
}

impl SqliteStickerStore {
    /// Loads the current collection so subscribers start from what is on disk.
    pub async fn open(db: Database) -> Result<Self> {
        let initial = db
            .list_stickers()
            .await
            .context("failed to load sticker collection")?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self { db, tx })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn republish(&self) {
        match self.db.list_stickers().await {
            Ok(stickers) => {
                self.tx.send_replace(stickers);
            }
            Err(err) => {
                // The insert already succeeded; observers catch up on the next add.
                log_warn!("failed to refresh sticker collection: {err:?}");
            }
        }
    }
}

#[async_trait]
impl StickerStore for SqliteStickerStore {
    async fn add(&self, sticker: Sticker) -> Result<Sticker> {
        let stored = self.db.insert_sticker(&sticker).await?;
        log_debug!("stored sticker {} ({})", stored.id, stored.name);
        self.republish().await;
        Ok(stored)
    }

    async fn all(&self) -> Result<Vec<Sticker>> {
        self.db.list_stickers().await
    }

    async fn count(&self) -> Result<u64> {
        self.db.count_stickers().await
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Sticker>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open() -> (tempfile::TempDir, SqliteStickerStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("focusup.sqlite3")).unwrap();
        let store = SqliteStickerStore::open(db).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn issue_persists_and_republishes() {
        let (_dir, store) = open().await;
        let mut rx = store.subscribe();

        let issued = store.issue().await.unwrap();
        assert!(issued.is_persisted());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), vec![issued.clone()]);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.all().await.unwrap(), vec![issued]);
    }

    #[tokio::test]
    async fn open_seeds_subscribers_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusup.sqlite3");
        {
            let db = Database::new(path.clone()).unwrap();
            db.insert_sticker(&Sticker::unsaved("💎", "Diamond", 1)).await.unwrap();
            db.insert_sticker(&Sticker::unsaved("🧠", "Brain", 2)).await.unwrap();
        }

        let store = SqliteStickerStore::open(Database::new(path).unwrap())
            .await
            .unwrap();
        let names: Vec<String> = store
            .subscribe()
            .borrow()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["Brain", "Diamond"]);
    }
}
