use crate::config::settings::AppConfig;
use crate::infrastructure::media::MediaEngine;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub engine: Arc<dyn MediaEngine>,
    /// Single permit; held for a whole request when outputs use fixed names.
    pub admission: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: AppConfig, engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            config,
            engine,
            admission: Arc::new(Semaphore::new(1)),
        }
    }
}
