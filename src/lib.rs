pub mod db;
pub mod lifecycle;
pub mod settings;
pub mod stickers;
pub mod timer;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;

use db::Database;
use lifecycle::LifecycleAdapter;
use settings::SettingsStore;
use stickers::{SqliteStickerStore, StickerBook, StickerStore};
use timer::TimerController;

pub use utils::init_logging;

const DATABASE_FILE: &str = "focusup.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// Everything a host shell needs, wired together.
pub struct AppState {
    pub db: Database,
    pub stickers: Arc<dyn StickerStore>,
    pub sticker_book: StickerBook,
    pub timer: TimerController,
    pub lifecycle: LifecycleAdapter,
    pub settings: SettingsStore,
}

/// Opens the data directory and builds the application state.
///
/// Logging is left to the host; call [`init_logging`] first to get the
/// default `env_logger` setup.
pub async fn bootstrap(data_dir: &Path) -> Result<AppState> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
    let config = settings.get();

    let database = Database::new(data_dir.join(DATABASE_FILE))?;
    let stickers: Arc<dyn StickerStore> = Arc::new(SqliteStickerStore::open(database.clone()).await?);
    let sticker_book = StickerBook::new(&stickers);

    let timer = TimerController::new(stickers.clone()).with_poll_interval(config.poll_interval());
    let lifecycle = LifecycleAdapter::new(Arc::new(timer.clone()), config.focus_loss_policy);

    info!(
        "FocusUp ready: {} stickers collected, polling every {:?}",
        sticker_book.view().count,
        timer.poll_interval()
    );

    Ok(AppState {
        db: database,
        stickers,
        sticker_book,
        timer,
        lifecycle,
        settings,
    })
}

impl AppState {
    /// Persists a new focus-loss policy and applies it immediately.
    pub fn set_focus_loss_policy(&self, policy: lifecycle::FocusLossPolicy) -> Result<()> {
        self.settings.update_focus_loss_policy(policy)?;
        self.lifecycle.set_policy(policy);
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
        info!("FocusUp shutting down");
    }
}
