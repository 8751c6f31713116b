pub mod touch;

pub use touch::{TouchContact, TouchSample};

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Событие для виртуального устройства (синтетическая клавиша питания)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerKeyEvent {
    pub state: KeyState,
    pub timestamp: std::time::Instant,
}

impl PowerKeyEvent {
    pub fn new(state: KeyState) -> Self {
        Self {
            state,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn press() -> Self {
        Self::new(KeyState::Pressed)
    }

    pub fn release() -> Self {
        Self::new(KeyState::Released)
    }
}
