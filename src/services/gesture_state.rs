use crate::error::{Dt2wError, Result};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Общее состояние демона: флаг включения и координаты последнего тапа.
/// Доступ идёт из задач управляющего интерфейса и детектора жестов,
/// поэтому поля атомарные. Все значения стартуют с нуля - состояние
/// не переживает перезапуск.
#[derive(Debug, Default)]
pub struct GestureState {
    enabled: AtomicBool,
    x_coord: AtomicI32,
    y_coord: AtomicI32,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Установить флаг из "сырого" значения управляющего файла.
    /// Принимаются только 0 и 1, всё остальное отклоняется.
    pub fn set_enabled_raw(&self, value: i64) -> Result<()> {
        match value {
            0 => self.set_enabled(false),
            1 => self.set_enabled(true),
            other => {
                return Err(Dt2wError::InvalidValue(format!(
                    "doubletap2wake_enable принимает только 0 или 1, получено {}",
                    other
                )))
            }
        }
        Ok(())
    }

    pub fn x_coord(&self) -> i32 {
        self.x_coord.load(Ordering::Relaxed)
    }

    pub fn y_coord(&self) -> i32 {
        self.y_coord.load(Ordering::Relaxed)
    }

    pub fn set_x_coord(&self, x: i32) {
        self.x_coord.store(x, Ordering::Relaxed);
    }

    pub fn set_y_coord(&self, y: i32) {
        self.y_coord.store(y, Ordering::Relaxed);
    }

    /// Запомнить координаты принятого тапа
    pub fn record_tap(&self, x: i32, y: i32) {
        self.set_x_coord(x);
        self.set_y_coord(y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_zero() {
        let state = GestureState::new();
        assert!(!state.enabled());
        assert_eq!(state.x_coord(), 0);
        assert_eq!(state.y_coord(), 0);
    }

    #[test]
    fn test_set_enabled_raw_accepts_only_binary() {
        let state = GestureState::new();

        assert!(state.set_enabled_raw(1).is_ok());
        assert!(state.enabled());

        assert!(state.set_enabled_raw(0).is_ok());
        assert!(!state.enabled());

        // Неверное значение отклоняется, прежнее состояние сохраняется
        state.set_enabled(true);
        assert!(state.set_enabled_raw(2).is_err());
        assert!(state.enabled());

        assert!(state.set_enabled_raw(-1).is_err());
        assert!(state.enabled());
    }

    #[test]
    fn test_record_tap_updates_coordinates() {
        let state = GestureState::new();
        state.record_tap(123, -45);
        assert_eq!(state.x_coord(), 123);
        assert_eq!(state.y_coord(), -45);
    }
}
