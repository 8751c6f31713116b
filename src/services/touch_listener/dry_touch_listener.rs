use crate::config::Config;
use crate::error::Result;
use crate::services::GestureDetector;
use std::sync::Arc;
use tracing::{debug, info};

use super::r#trait::TouchListenerTrait;

pub struct DryRunTouchListener {
    config: Arc<Config>,
    #[allow(dead_code)]
    detector: Arc<GestureDetector>,
}

impl DryRunTouchListener {
    pub fn new(config: Arc<Config>, detector: Arc<GestureDetector>) -> Result<Self> {
        info!("Инициализация DryRunTouchListener");
        Ok(Self { config, detector })
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - TouchListener работает в режиме эмуляции");
        info!(
            "Параметры жеста (dry-run): окно {}мс, перо {}px",
            self.config.gesture.time_window_ms, self.config.gesture.feather_px
        );

        loop {
            // Эмулируем периодическую активность для тестирования
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            debug!("TouchListener работает в dry-run режиме");
        }
    }
}

#[async_trait::async_trait]
impl TouchListenerTrait for DryRunTouchListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
