use std::sync::Arc;

use catalog::{get_catalog, get_catalog_remote};
use tracing::info;

use super::{
    config::Config,
    database::{RedisProgressStore, init_redis},
    engine::UnlockEngine,
};

pub struct State {
    pub config: Config,
    pub engine: UnlockEngine,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let catalog = match &config.catalog_url {
            Some(url) => get_catalog_remote(url).await.expect("Catalog unreachable!"),
            None => get_catalog(&config.catalog_path).expect("Catalog misconfigured!"),
        };
        info!(
            "Loaded catalog with {} game unlock items",
            catalog.game_unlock_items().count()
        );

        let redis_connection = init_redis(&config.redis_url).await;
        let store = Arc::new(RedisProgressStore::new(redis_connection));

        let engine = UnlockEngine::new(store, catalog);

        Arc::new(Self { config, engine })
    }
}
