use std::fmt;
use std::time::{Duration, Instant};

/// Завершённое касание: точка постановки пальца и момент времени
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSample {
    pub x: i32,
    pub y: i32,
    pub timestamp: Instant,
}

impl TouchSample {
    pub fn new(x: i32, y: i32, timestamp: Instant) -> Self {
        Self { x, y, timestamp }
    }

    /// Проверить, что другое касание лежит в пределах "пера" (feather)
    /// по каждой оси независимо — так считают драйверы семейства dt2w
    pub fn within_feather(&self, other: &TouchSample, feather_px: i32) -> bool {
        (self.x - other.x).abs() <= feather_px && (self.y - other.y).abs() <= feather_px
    }

}

impl fmt::Display for TouchSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Текущий (незавершённый) контакт с экраном
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchContact {
    pub down_x: i32,
    pub down_y: i32,
    pub x: i32,
    pub y: i32,
    pub down_at: Instant,
}

impl TouchContact {
    pub fn new(x: i32, y: i32, down_at: Instant) -> Self {
        Self {
            down_x: x,
            down_y: y,
            x,
            y,
            down_at,
        }
    }

    /// Обновить текущую позицию контакта
    pub fn update_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Является ли контакт "тапом": палец не уехал дальше slop
    /// и не задержался дольше max_duration
    pub fn is_tap(&self, released_at: Instant, slop_px: i32, max_duration: Duration) -> bool {
        let moved = (self.x - self.down_x).abs() > slop_px || (self.y - self.down_y).abs() > slop_px;
        let held = released_at
            .checked_duration_since(self.down_at)
            .map(|d| d > max_duration)
            .unwrap_or(true);
        !moved && !held
    }

    /// Завершить контакт, получив итоговый TouchSample с точкой постановки
    pub fn finish(&self) -> TouchSample {
        TouchSample::new(self.down_x, self.down_y, self.down_at)
    }
}
