use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::settings::AppConfig;
use crate::modules::transcode::encoder::Encoder;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub encoder: Arc<dyn Encoder>,
    /// Bounds concurrent encoding subprocesses across all requests.
    pub encode_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: AppConfig, encoder: Arc<dyn Encoder>) -> Self {
        let permits = config.max_concurrent_encodes.max(1);
        Self {
            config: Arc::new(config),
            encoder,
            encode_permits: Arc::new(Semaphore::new(permits)),
        }
    }
}
