use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const WAKE_LOCK_PATH: &str = "/sys/power/wake_lock";
const WAKE_UNLOCK_PATH: &str = "/sys/power/wake_unlock";

/// Источник пробуждения (wakeup source) в пользовательском пространстве:
/// Android-style wake lock через /sys/power/wake_lock. На системах без
/// этого интерфейса превращается в no-op с предупреждением.
pub struct WakeLock {
    name: String,
    held: bool,
}

impl WakeLock {
    /// Захватить wake lock с заданным именем (best-effort)
    pub fn acquire(name: &str) -> Self {
        let held = if Path::new(WAKE_LOCK_PATH).exists() {
            match fs::write(WAKE_LOCK_PATH, name) {
                Ok(()) => {
                    info!("Wake lock '{}' захвачен", name);
                    true
                }
                Err(e) => {
                    warn!("Не удалось захватить wake lock '{}': {}", name, e);
                    false
                }
            }
        } else {
            debug!("{} отсутствует, wake lock не используется", WAKE_LOCK_PATH);
            false
        };

        Self {
            name: name.to_string(),
            held,
        }
    }

    /// Освободить wake lock. Вызывается последним шагом остановки демона.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }

        match fs::write(WAKE_UNLOCK_PATH, &self.name) {
            Ok(()) => info!("Wake lock '{}' освобождён", self.name),
            Err(e) => warn!("Не удалось освободить wake lock '{}': {}", self.name, e),
        }

        self.held = false;
    }
}

impl Drop for WakeLock {
    fn drop(&mut self) {
        self.release();
    }
}
