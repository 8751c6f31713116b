use crate::error::{Dt2wError, Result};
use crate::events::{KeyState, PowerKeyEvent};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Evdev-код клавиши питания (KEY_POWER)
pub const KEY_POWER: i32 = 116;

const EV_KEY: i32 = 1;
const EV_SYN: i32 = 0;

pub struct VirtualDevice {
    device: Option<Mutex<uinput::Device>>,
    device_name: String,
    dry_run: bool,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Mutex::new(Self::create_virtual_device(device_name)?))
        };

        Ok(Self {
            device,
            device_name: device_name.to_string(),
            dry_run,
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для инъекции клавиши питания", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)
            .unwrap()
            .event(uinput::event::Keyboard::All)
            .unwrap()
            .create()
            .map_err(|e| Dt2wError::Internal(format!("Не удалось создать виртуальное устройство '{}': {}", device_name, e)))?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    pub fn send_event(&self, event: PowerKeyEvent) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {:?}", event);
            return Ok(());
        }

        debug!("Обработка виртуального события: {:?}", event);

        if let Some(device) = &self.device {
            let mut device = device.lock();
            let value = match event.state {
                KeyState::Pressed => 1,
                KeyState::Released => 0,
            };

            // Отправляем событие клавиши питания
            if let Err(e) = device.write(EV_KEY, KEY_POWER, value) {
                return Err(Dt2wError::Internal(format!("Не удалось отправить событие KEY_POWER: {}", e)));
            }

            // Синхронизируем события
            if let Err(e) = device.write(EV_SYN, 0, 0) {
                return Err(Dt2wError::Internal(format!("Не удалось синхронизировать события: {}", e)));
            }

            debug!("Виртуальное событие KEY_POWER ({}) отправлено", value);
        } else {
            return Err(Dt2wError::Internal("Виртуальное устройство недоступно".to_string()));
        }

        Ok(())
    }

    /// Нажатие + отпускание клавиши питания одной операцией.
    /// Никаких проверок флага включения здесь нет: если эмиссия
    /// запланирована, она выполняется.
    pub fn press_power(&self) -> Result<()> {
        self.send_event(PowerKeyEvent::press())?;
        self.send_event(PowerKeyEvent::release())?;
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}
