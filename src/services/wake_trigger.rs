use crate::error::Result;
use crate::services::VirtualDevice;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Исполнитель эмиссии клавиши питания. Выделен в трейт, чтобы
/// триггер можно было проверять без реального uinput-устройства.
pub trait PowerKeyEmitter: Send + Sync {
    fn press_power(&self) -> Result<()>;
}

impl PowerKeyEmitter for VirtualDevice {
    fn press_power(&self) -> Result<()> {
        VirtualDevice::press_power(self)
    }
}

/// Одноразовый отложенный триггер пробуждения.
///
/// `schedule()` планирует ровно одну эмиссию нажатие+отпускание через
/// заданную задержку и никогда не перепланирует сам себя - повторное
/// срабатывание возможно только от следующего распознанного жеста.
/// Эмиссия не перепроверяет флаг включения: запланировано - выполняется.
pub struct WakeTrigger {
    emitter: Arc<dyn PowerKeyEmitter>,
    delay: Duration,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl WakeTrigger {
    pub fn new(emitter: Arc<dyn PowerKeyEmitter>, delay: Duration) -> Self {
        info!("Инициализация WakeTrigger (задержка: {}мс)", delay.as_millis());

        Self {
            emitter,
            delay,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Запланировать одну отложенную эмиссию клавиши питания
    pub async fn schedule(&self) {
        let emitter = Arc::clone(&self.emitter);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            sleep(delay).await;

            if let Err(e) = emitter.press_power() {
                error!("Не удалось выполнить эмиссию клавиши питания: {}", e);
            } else {
                info!("Синтетическое нажатие KEY_POWER отправлено");
            }
        });

        let mut pending = self.pending.lock().await;
        // Завершившиеся задачи больше не нужны
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Дождаться завершения всех запланированных эмиссий.
    /// Вызывается при остановке демона: выгрузка блокируется,
    /// пока отложенная работа не закончится.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().await;
            pending.drain(..).collect()
        };

        if !handles.is_empty() {
            info!("Ожидание завершения {} отложенных эмиссий", handles.len());
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    #[tokio::test]
    async fn test_schedule_emits_exactly_once() {
        let emitter = Arc::new(CountingEmitter::new());
        let trigger = WakeTrigger::new(emitter.clone(), Duration::from_millis(10));

        trigger.schedule().await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(emitter.count(), 1);
    }

    #[tokio::test]
    async fn test_no_auto_reschedule() {
        let emitter = Arc::new(CountingEmitter::new());
        let trigger = WakeTrigger::new(emitter.clone(), Duration::from_millis(10));

        trigger.schedule().await;
        // Ждём заметно дольше задержки: повторных срабатываний быть не должно
        sleep(Duration::from_millis(200)).await;

        assert_eq!(emitter.count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_inflight_emission() {
        let emitter = Arc::new(CountingEmitter::new());
        let trigger = WakeTrigger::new(emitter.clone(), Duration::from_millis(50));

        trigger.schedule().await;
        trigger.shutdown().await;

        // После shutdown отложенная эмиссия обязана быть завершена
        assert_eq!(emitter.count(), 1);
    }

    #[tokio::test]
    async fn test_each_schedule_emits_independently() {
        let emitter = Arc::new(CountingEmitter::new());
        let trigger = WakeTrigger::new(emitter.clone(), Duration::from_millis(10));

        trigger.schedule().await;
        trigger.schedule().await;
        trigger.shutdown().await;

        assert_eq!(emitter.count(), 2);
    }
}
