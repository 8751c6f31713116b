use crate::events::TouchContact;
use std::time::Instant;

// Сырые evdev-коды протоколов касания (input-event-codes.h)
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_POSITION_X: u16 = 0x35; // = 53
pub const ABS_MT_POSITION_Y: u16 = 0x36; // = 54
pub const ABS_MT_TRACKING_ID: u16 = 0x39; // = 57
pub const BTN_TOUCH: u16 = 0x14a; // = 330

/// Сборка контактов из потока событий тачскрина.
///
/// Понимает оба варианта: multitouch-протокол (ABS_MT_TRACKING_ID,
/// ABS_MT_POSITION_*) и одиночный (BTN_TOUCH + ABS_X/ABS_Y). Слоты не
/// отслеживаются - как и оригинальный драйвер, ведём один активный
/// контакт; второй палец лишь сдвигает текущие координаты.
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: bool,
    down_at: Option<Instant>,
    contact: Option<TouchContact>,
    last_x: i32,
    last_y: i32,
    have_position: bool,
    // Кадр постановки пальца ещё не закрыт SYN_REPORT: координаты,
    // пришедшие в нём, уточняют точку постановки, а не движение
    down_frame: bool,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Отметить границу кадра событий (SYN_REPORT)
    pub fn handle_sync(&mut self) {
        self.down_frame = false;
    }

    /// Обработать событие абсолютной оси.
    /// Возвращает завершённый контакт, если палец оторвался от экрана.
    pub fn handle_absolute(
        &mut self,
        code: u16,
        value: i32,
        now: Instant,
    ) -> Option<(TouchContact, Instant)> {
        match code {
            ABS_MT_POSITION_X | ABS_X => {
                self.position_x(value);
                None
            }
            ABS_MT_POSITION_Y | ABS_Y => {
                self.position_y(value);
                None
            }
            ABS_MT_TRACKING_ID => {
                if value >= 0 {
                    self.touch_down(now);
                    None
                } else {
                    self.touch_up(now)
                }
            }
            _ => None,
        }
    }

    /// Обработать клавишное событие (BTN_TOUCH)
    pub fn handle_key(
        &mut self,
        code: u16,
        value: i32,
        now: Instant,
    ) -> Option<(TouchContact, Instant)> {
        if code != BTN_TOUCH {
            return None;
        }

        if value == 1 {
            self.touch_down(now);
            None
        } else {
            self.touch_up(now)
        }
    }

    fn touch_down(&mut self, now: Instant) {
        if self.touching {
            return;
        }

        self.touching = true;
        self.down_at = Some(now);
        self.down_frame = true;

        // Координаты могли прийти раньше события постановки пальца;
        // если они устарели, кадр постановки их уточнит
        if self.have_position {
            self.contact = Some(TouchContact::new(self.last_x, self.last_y, now));
        }
    }

    fn touch_up(&mut self, now: Instant) -> Option<(TouchContact, Instant)> {
        if !self.touching {
            return None;
        }

        self.touching = false;
        self.down_at = None;
        self.down_frame = false;

        self.contact.take().map(|contact| (contact, now))
    }

    fn position_x(&mut self, x: i32) {
        self.last_x = x;
        self.have_position = true;
        self.apply_position();
    }

    fn position_y(&mut self, y: i32) {
        self.last_y = y;
        self.have_position = true;
        self.apply_position();
    }

    fn apply_position(&mut self) {
        if !self.touching {
            return;
        }

        match &mut self.contact {
            Some(contact) if self.down_frame => {
                // Координата из кадра постановки переопределяет точку постановки
                if let Some(down_at) = self.down_at {
                    *contact = TouchContact::new(self.last_x, self.last_y, down_at);
                }
            }
            Some(contact) => contact.update_position(self.last_x, self.last_y),
            None => {
                // Постановка пальца уже была, первая координата создаёт контакт
                if let Some(down_at) = self.down_at {
                    self.contact = Some(TouchContact::new(self.last_x, self.last_y, down_at));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_touch_protocol() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        assert!(tracker.handle_key(BTN_TOUCH, 1, t0).is_none());
        assert!(tracker.handle_absolute(ABS_X, 100, t0).is_none());
        assert!(tracker.handle_absolute(ABS_Y, 200, t0).is_none());

        let (contact, _released_at) = tracker.handle_key(BTN_TOUCH, 0, t0).unwrap();
        assert_eq!(contact.down_x, 100);
        assert_eq!(contact.down_y, 200);
        assert_eq!(contact.down_at, t0);
    }

    #[test]
    fn test_multitouch_protocol() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        assert!(tracker.handle_absolute(ABS_MT_TRACKING_ID, 5, t0).is_none());
        assert!(tracker.handle_absolute(ABS_MT_POSITION_X, 300, t0).is_none());
        assert!(tracker.handle_absolute(ABS_MT_POSITION_Y, 400, t0).is_none());

        let (contact, _) = tracker.handle_absolute(ABS_MT_TRACKING_ID, -1, t0).unwrap();
        assert_eq!(contact.down_x, 300);
        assert_eq!(contact.down_y, 400);
    }

    #[test]
    fn test_coordinates_before_touch_down() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        // Некоторые прошивки шлют координаты до BTN_TOUCH
        tracker.handle_absolute(ABS_X, 10, t0);
        tracker.handle_absolute(ABS_Y, 20, t0);
        tracker.handle_key(BTN_TOUCH, 1, t0);

        let (contact, _) = tracker.handle_key(BTN_TOUCH, 0, t0).unwrap();
        assert_eq!(contact.down_x, 10);
        assert_eq!(contact.down_y, 20);
    }

    #[test]
    fn test_movement_tracked_within_contact() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        tracker.handle_key(BTN_TOUCH, 1, t0);
        tracker.handle_absolute(ABS_X, 100, t0);
        tracker.handle_absolute(ABS_Y, 100, t0);
        tracker.handle_sync();
        tracker.handle_absolute(ABS_X, 250, t0);

        let (contact, _) = tracker.handle_key(BTN_TOUCH, 0, t0).unwrap();
        // Точка постановки сохранена, текущая позиция обновлена
        assert_eq!(contact.down_x, 100);
        assert_eq!(contact.x, 250);
    }

    #[test]
    fn test_second_tap_overrides_stale_position() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        // Первый тап в (100, 100)
        tracker.handle_key(BTN_TOUCH, 1, t0);
        tracker.handle_absolute(ABS_X, 100, t0);
        tracker.handle_absolute(ABS_Y, 100, t0);
        tracker.handle_sync();
        tracker.handle_key(BTN_TOUCH, 0, t0);
        tracker.handle_sync();

        // Второй тап: контакт создаётся со старыми координатами,
        // но кадр постановки уточняет точку
        tracker.handle_key(BTN_TOUCH, 1, t0);
        tracker.handle_absolute(ABS_X, 500, t0);
        tracker.handle_absolute(ABS_Y, 600, t0);
        tracker.handle_sync();

        let (contact, _) = tracker.handle_key(BTN_TOUCH, 0, t0).unwrap();
        assert_eq!(contact.down_x, 500);
        assert_eq!(contact.down_y, 600);
    }

    #[test]
    fn test_lift_without_touch_is_ignored() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        assert!(tracker.handle_key(BTN_TOUCH, 0, t0).is_none());
        assert!(tracker.handle_absolute(ABS_MT_TRACKING_ID, -1, t0).is_none());
    }

    #[test]
    fn test_touch_without_coordinates_yields_nothing() {
        let mut tracker = ContactTracker::new();
        let t0 = Instant::now();

        tracker.handle_key(BTN_TOUCH, 1, t0);
        assert!(tracker.handle_key(BTN_TOUCH, 0, t0).is_none());
    }
}
