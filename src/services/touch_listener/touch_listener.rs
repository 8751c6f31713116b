use crate::config::Config;
use crate::error::{Dt2wError, Result};
use crate::services::GestureDetector;
use crate::utils::DeviceFinder;
use evdev::{Device, EventType};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::contact_tracker::ContactTracker;
use super::r#trait::TouchListenerTrait;

pub struct RealTouchListener {
    config: Arc<Config>,
    detector: Arc<GestureDetector>,
    device: Device,
    tracker: ContactTracker,
}

impl RealTouchListener {
    pub fn new(config: Arc<Config>, detector: Arc<GestureDetector>) -> Result<Self> {
        info!("Инициализация RealTouchListener");

        let device_path = DeviceFinder::find_touch_device(&config.input.device_path)?;

        let device = Device::open(&device_path).map_err(|e| {
            Dt2wError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        // Эксклюзивный захват (grab) намеренно не выполняется:
        // композитору события касаний по-прежнему нужны
        info!("Тачскрин: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());

        Ok(Self {
            config,
            detector,
            device,
            tracker: ContactTracker::new(),
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealTouchListener запущен, начинаем чтение событий");
        info!(
            "Параметры жеста: окно {}мс, перо {}px, тап до {}мс",
            self.config.gesture.time_window_ms,
            self.config.gesture.feather_px,
            self.config.gesture.max_tap_duration_ms
        );

        loop {
            // Обработка событий тачскрина (неблокирующая)
            let events_vec = match self.device.fetch_events() {
                Ok(events) => events.collect::<Vec<_>>(),
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            for event in events_vec {
                if let Err(e) = self.handle_event(event).await {
                    error!("Ошибка обработки события: {}", e);
                }
            }

            // Небольшая задержка для предотвращения 100% загрузки CPU
            tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        }
    }

    async fn handle_event(&mut self, event: evdev::InputEvent) -> Result<()> {
        let now = Instant::now();

        let finished = if event.event_type() == EventType::ABSOLUTE {
            self.tracker.handle_absolute(event.code(), event.value(), now)
        } else if event.event_type() == EventType::KEY {
            self.tracker.handle_key(event.code(), event.value(), now)
        } else if event.event_type() == EventType::SYNCHRONIZATION {
            self.tracker.handle_sync();
            None
        } else {
            debug!("Пропуск события: {:?}", event);
            None
        };

        if let Some((contact, released_at)) = finished {
            debug!("Контакт завершён: ({}, {})", contact.down_x, contact.down_y);

            if let Err(e) = self
                .detector
                .handle_contact_finished(contact, released_at)
                .await
            {
                error!("Ошибка при обработке контакта в GestureDetector: {}", e);
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl TouchListenerTrait for RealTouchListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
