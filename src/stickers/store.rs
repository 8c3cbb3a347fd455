use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use crate::db::models::{sort_newest_first, Sticker};

use super::catalog::draw_sticker;

/// Persistence contract consumed by the timer.
///
/// `add` must be durable before it returns. Implementations republish the
/// full newest-first list on the `subscribe` channel after every add.
#[async_trait]
pub trait StickerStore: Send + Sync {
    /// Unsaved sticker (`id == 0`) drawn uniformly from the catalog and
    /// stamped with the current time.
    fn draw(&self) -> Sticker {
        draw_sticker(&mut rand::thread_rng(), Utc::now().timestamp_millis())
    }

    async fn add(&self, sticker: Sticker) -> Result<Sticker>;

    /// Draw and persist as one operation.
    async fn issue(&self) -> Result<Sticker> {
        let sticker = self.draw();
        self.add(sticker).await
    }

    async fn all(&self) -> Result<Vec<Sticker>>;

    async fn count(&self) -> Result<u64>;

    fn subscribe(&self) -> watch::Receiver<Vec<Sticker>>;
}

/// In-process store. Ids start at 1 and increase monotonically.
pub struct MemoryStickerStore {
    inner: Mutex<MemoryInner>,
    fail_writes: AtomicBool,
    tx: watch::Sender<Vec<Sticker>>,
}

struct MemoryInner {
    next_id: i64,
    stickers: Vec<Sticker>,
}

impl MemoryStickerStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            inner: Mutex::new(MemoryInner {
                next_id: 1,
                stickers: Vec::new(),
            }),
            fail_writes: AtomicBool::new(false),
            tx,
        }
    }

    /// While set, every `add` fails as if the backing storage were gone.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryStickerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StickerStore for MemoryStickerStore {
    async fn add(&self, sticker: Sticker) -> Result<Sticker> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("sticker store unavailable");
        }

        let (stored, snapshot) = {
            let mut inner = self.lock();
            let stored = Sticker {
                id: inner.next_id,
                ..sticker
            };
            inner.next_id += 1;
            inner.stickers.push(stored.clone());
            sort_newest_first(&mut inner.stickers);
            (stored, inner.stickers.clone())
        };

        self.tx.send_replace(snapshot);
        Ok(stored)
    }

    async fn all(&self) -> Result<Vec<Sticker>> {
        Ok(self.lock().stickers.clone())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.lock().stickers.len() as u64)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Sticker>> {
        self.tx.subscribe()
    }
}
