use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::matching::MatchEngine;
use crate::venues::VenueSearchProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub venues: Arc<VenueSearchProvider>,
    pub engine: Arc<MatchEngine>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn DatabaseBackend>,
        venues: Arc<VenueSearchProvider>,
    ) -> Self {
        let config = Arc::new(config);
        let engine = Arc::new(MatchEngine::new(
            db.clone(),
            venues.clone(),
            config.matching.clone(),
        ));

        Self {
            config,
            db,
            venues,
            engine,
        }
    }
}
