use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::storage::media::MediaPaths;
use crate::modules::conversion::encoder::RenditionEncoder;
use crate::modules::conversion::registry::JobStore;
use crate::modules::movie::repository::CatalogStore;
use crate::modules::watchlist::repository::WatchlistStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub catalog: Arc<dyn CatalogStore>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub jobs: Arc<dyn JobStore>,
    pub encoder: Arc<dyn RenditionEncoder>,
    pub media: MediaPaths,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        catalog: Arc<dyn CatalogStore>,
        watchlist: Arc<dyn WatchlistStore>,
        jobs: Arc<dyn JobStore>,
        encoder: Arc<dyn RenditionEncoder>,
    ) -> Self {
        let media = MediaPaths::new(config.media_root.clone());
        Self {
            config: Arc::new(config),
            db,
            catalog,
            watchlist,
            jobs,
            encoder,
            media,
        }
    }
}
