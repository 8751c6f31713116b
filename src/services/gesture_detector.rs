use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{TouchContact, TouchSample};
use crate::services::{GestureState, WakeTrigger};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Первый тап пары и крайний срок, до которого должен произойти второй
#[derive(Debug, Clone, Copy)]
struct PendingTap {
    first: TouchSample,
    deadline: Instant,
}

/// Детектор двойного тапа.
///
/// Получает завершённые контакты от слушателя касаний, отбрасывает
/// всё, что не является тапом (свайпы, долгие удержания), и сравнивает
/// пары тапов по временному окну и "перу". Распознанная пара взводит
/// WakeTrigger ровно один раз и сбрасывает ожидание.
pub struct GestureDetector {
    config: Arc<Config>,
    state: Arc<GestureState>,
    trigger: Arc<WakeTrigger>,
    pending: Mutex<Option<PendingTap>>,
}

impl GestureDetector {
    pub fn new(config: Arc<Config>, state: Arc<GestureState>, trigger: Arc<WakeTrigger>) -> Self {
        info!(
            "Инициализация GestureDetector (окно: {}мс, перо: {}px)",
            config.gesture.time_window_ms, config.gesture.feather_px
        );

        Self {
            config,
            state,
            trigger,
            pending: Mutex::new(None),
        }
    }

    /// Обработать завершённый контакт с экраном
    pub async fn handle_contact_finished(
        &self,
        contact: TouchContact,
        released_at: Instant,
    ) -> Result<()> {
        if !self.state.enabled() {
            debug_if_enabled!("Детекция выключена, контакт игнорируется");
            let mut pending = self.pending.lock();
            *pending = None;
            return Ok(());
        }

        let is_tap = contact.is_tap(
            released_at,
            self.config.gesture.tap_slop_px,
            self.config.max_tap_duration(),
        );

        if !is_tap {
            // Свайп или долгое удержание обрывают начатую пару
            debug!("Контакт не является тапом, сброс ожидания второго тапа");
            let mut pending = self.pending.lock();
            *pending = None;
            return Ok(());
        }

        let sample = contact.finish();
        self.state.record_tap(sample.x, sample.y);

        let should_trigger = self.register_tap(sample);

        if should_trigger {
            info!("Двойной тап распознан в {}", sample);
            self.trigger.schedule().await;
        }

        Ok(())
    }

    /// Сопоставить тап с ожидающим первым тапом.
    /// Возвращает true, если пара распознана и триггер нужно взвести.
    fn register_tap(&self, sample: TouchSample) -> bool {
        let mut pending = self.pending.lock();

        if let Some(p) = pending.take() {
            let in_time = sample.timestamp <= p.deadline;
            let in_feather = p.first.within_feather(&sample, self.config.gesture.feather_px);

            debug_if_enabled!(
                "Второй тап {}: окно {}, перо {}",
                sample,
                in_time,
                in_feather
            );

            if in_time && in_feather {
                // Пара распознана, ожидание сброшено выше через take()
                return true;
            }
        }

        // Тап становится новым первым тапом пары
        debug_if_enabled!("Тап {} запомнен как первый в паре", sample);
        *pending = Some(PendingTap {
            first: sample,
            deadline: sample.timestamp + self.config.time_window(),
        });

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::wake_trigger::PowerKeyEmitter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingEmitter {
        presses: AtomicUsize,
    }

    impl CountingEmitter {
        fn new() -> Self {
            Self {
                presses: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.presses.load(Ordering::SeqCst)
        }
    }

    impl PowerKeyEmitter for CountingEmitter {
        fn press_power(&self) -> Result<()> {
            self.presses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn make_detector() -> (GestureDetector, Arc<CountingEmitter>, Arc<GestureState>) {
        let config = Arc::new(Config::default());

        let emitter = Arc::new(CountingEmitter::new());
        let trigger = Arc::new(WakeTrigger::new(emitter.clone(), Duration::from_millis(0)));
        let state = Arc::new(GestureState::new());
        let detector = GestureDetector::new(config, state.clone(), trigger);

        (detector, emitter, state)
    }

    fn tap_at(x: i32, y: i32, at: Instant) -> TouchContact {
        TouchContact::new(x, y, at)
    }

    async fn settle(detector: &GestureDetector) {
        detector.trigger.shutdown().await;
    }

    #[tokio::test]
    async fn test_double_tap_triggers_once() {
        let (detector, emitter, state) = make_detector();
        state.set_enabled(true);

        let t0 = Instant::now();
        let first = tap_at(100, 200, t0);
        let second = tap_at(120, 210, t0 + Duration::from_millis(300));

        detector
            .handle_contact_finished(first, t0 + Duration::from_millis(50))
            .await
            .unwrap();
        detector
            .handle_contact_finished(second, t0 + Duration::from_millis(350))
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 1);
    }

    #[tokio::test]
    async fn test_taps_too_far_apart_do_not_trigger() {
        let (detector, emitter, _state) = make_detector();
        detector.state.set_enabled(true);

        let t0 = Instant::now();
        let first = tap_at(100, 200, t0);
        // Дальше пера по оси X (по умолчанию 150px)
        let second = tap_at(400, 200, t0 + Duration::from_millis(300));

        detector
            .handle_contact_finished(first, t0 + Duration::from_millis(50))
            .await
            .unwrap();
        detector
            .handle_contact_finished(second, t0 + Duration::from_millis(350))
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 0);

        // Далёкий тап становится новым первым: третий тап рядом с ним срабатывает
        let third = tap_at(410, 190, t0 + Duration::from_millis(500));
        detector
            .handle_contact_finished(third, t0 + Duration::from_millis(550))
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 1);
    }

    #[tokio::test]
    async fn test_tap_after_window_does_not_trigger() {
        let (detector, emitter, _state) = make_detector();
        detector.state.set_enabled(true);

        let t0 = Instant::now();
        let first = tap_at(100, 200, t0);
        // Окно по умолчанию 500мс
        let second = tap_at(100, 200, t0 + Duration::from_millis(800));

        detector
            .handle_contact_finished(first, t0 + Duration::from_millis(50))
            .await
            .unwrap();
        detector
            .handle_contact_finished(second, t0 + Duration::from_millis(850))
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_detector_ignores_taps() {
        let (detector, emitter, state) = make_detector();
        // enabled остаётся false

        let t0 = Instant::now();
        detector
            .handle_contact_finished(tap_at(100, 200, t0), t0 + Duration::from_millis(50))
            .await
            .unwrap();
        detector
            .handle_contact_finished(
                tap_at(100, 200, t0 + Duration::from_millis(200)),
                t0 + Duration::from_millis(250),
            )
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 0);
        // Координаты при выключенной детекции не обновляются
        assert_eq!(state.x_coord(), 0);
        assert_eq!(state.y_coord(), 0);
    }

    #[tokio::test]
    async fn test_swipe_resets_pending_tap() {
        let (detector, emitter, _state) = make_detector();
        detector.state.set_enabled(true);

        let t0 = Instant::now();
        detector
            .handle_contact_finished(tap_at(100, 200, t0), t0 + Duration::from_millis(50))
            .await
            .unwrap();

        // Свайп между тапами: палец уехал дальше slop
        let mut swipe = TouchContact::new(100, 200, t0 + Duration::from_millis(100));
        swipe.update_position(400, 200);
        detector
            .handle_contact_finished(swipe, t0 + Duration::from_millis(150))
            .await
            .unwrap();

        // Тап рядом с первым и внутри окна, но пара уже сброшена
        detector
            .handle_contact_finished(
                tap_at(110, 205, t0 + Duration::from_millis(300)),
                t0 + Duration::from_millis(350),
            )
            .await
            .unwrap();

        settle(&detector).await;
        assert_eq!(emitter.count(), 0);
    }

    #[tokio::test]
    async fn test_accepted_tap_records_coordinates() {
        let (detector, _emitter, state) = make_detector();
        state.set_enabled(true);

        let t0 = Instant::now();
        detector
            .handle_contact_finished(tap_at(123, 456, t0), t0 + Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(state.x_coord(), 123);
        assert_eq!(state.y_coord(), 456);
    }
}
