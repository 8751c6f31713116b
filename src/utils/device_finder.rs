use crate::error::{Dt2wError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти подходящее устройство тачскрина
    pub fn find_touch_device(device_path: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                Dt2wError::device_not_found(
                    format!("Указанное устройство не найдено: {:?}", path)
                )
            }
        }

        // Автопоиск тачскрина
        Self::auto_find_touchscreen()
    }

    fn auto_find_touchscreen() -> Result<PathBuf> {
        info!("Начинаем автопоиск тачскрина...");

        // Попробуем найти устройство по ID
        if let Ok(device) = Self::find_by_id() {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        // Попробуем найти устройство в /dev/input/event*
        if let Ok(device) = Self::find_by_event_devices() {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        Dt2wError::device_not_found(
            "Не удалось найти тачскрин. \
             Убедитесь, что пользователь добавлен в группу 'input'"
        )
    }

    fn find_by_id() -> Result<PathBuf> {
        let by_id_dir = Path::new("/dev/input/by-id");

        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return Dt2wError::device_not_found("Директория by-id не найдена");
        }

        let entries = fs::read_dir(by_id_dir)
            .map_err(|e| Dt2wError::Permission(
                format!("Нет доступа к /dev/input/by-id: {}", e)
            ))?;

        let mut candidates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(Dt2wError::Io)?;
            let path = entry.path();
            let name = path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("");

            if (name.contains("touchscreen") || name.contains("touch")) && name.contains("event") {
                debug!("Найден потенциальный тачскрин: {:?}", path);

                if Self::is_device_accessible(&path) {
                    candidates.push((path.clone(), name.to_string()));
                } else {
                    warn!("Устройство {:?} недоступно", path);
                }
            }
        }

        let mut touchscreens = Vec::new();

        for (path, name) in candidates {
            // Тачпады отдают похожие оси, но нам нужен именно экран
            if name.contains("touchpad") || name.contains("pad") {
                debug!("Исключаем как тачпад: {} -> {}", name, path.display());
                continue;
            }

            if Self::is_touch_device(&path)? {
                let priority = if name.ends_with("event-touchscreen") {
                    100 // Высший приоритет для -event-touchscreen устройств
                } else {
                    10 // Обычный приоритет
                };

                touchscreens.push((path, priority));
                info!("Добавлен тачскрин: {} (приоритет: {})", name, priority);
            } else {
                debug!("Устройство не прошло проверку как тачскрин: {}", name);
            }
        }

        touchscreens.sort_by(|a, b| b.1.cmp(&a.1));

        if let Some((touchscreen, _)) = touchscreens.into_iter().next() {
            Ok(touchscreen)
        } else {
            Dt2wError::device_not_found("Тачскрин не найден в by-id")
        }
    }

    fn find_by_event_devices() -> Result<PathBuf> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir)
            .map_err(|e| Dt2wError::Permission(
                format!("Нет доступа к /dev/input: {}", e)
            ))?;

        let mut event_devices = Vec::new();

        for entry in entries {
            let entry = entry.map_err(Dt2wError::Io)?;
            let path = entry.path();
            let name = path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("");

            if name.starts_with("event") {
                event_devices.push(path);
            }
        }

        // Сортируем устройства по номеру
        event_devices.sort();

        // Проверяем каждое устройство на предмет того, является ли оно тачскрином
        for device_path in event_devices {
            debug!("Проверяем устройство: {:?}", device_path);

            if Self::is_touch_device(&device_path)? && Self::is_device_accessible(&device_path) {
                return Ok(device_path);
            }
        }

        Dt2wError::device_not_found("Не найден доступный тачскрин среди event устройств")
    }

    fn is_touch_device(device_path: &Path) -> Result<bool> {
        // Используем evdev для проверки возможностей устройства
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let device_name = device.name().unwrap_or("Unknown").to_lowercase();

                // Исключаем клавиатуры, мыши и тачпады по имени устройства
                if device_name.contains("keyboard") ||
                   device_name.contains("mouse") ||
                   device_name.contains("touchpad") ||
                   device_name.contains("trackpoint") {
                    debug!("Исключаем устройство: {:?} ({})", device_path, device_name);
                    return Ok(false);
                }

                // Тачскрин отдаёт либо multitouch-оси, либо ABS_X/ABS_Y + BTN_TOUCH
                let axes = device.supported_absolute_axes();
                let has_mt = axes.as_ref().map_or(false, |a| {
                    a.contains(evdev::AbsoluteAxisCode::ABS_MT_POSITION_X)
                        && a.contains(evdev::AbsoluteAxisCode::ABS_MT_POSITION_Y)
                });
                let has_single = axes.as_ref().map_or(false, |a| {
                    a.contains(evdev::AbsoluteAxisCode::ABS_X)
                        && a.contains(evdev::AbsoluteAxisCode::ABS_Y)
                }) && device
                    .supported_keys()
                    .map_or(false, |keys| keys.contains(evdev::KeyCode::BTN_TOUCH));

                let is_touch = has_mt || has_single;

                if is_touch {
                    info!("Устройство {:?} подходит как тачскрин", device_path);
                    debug!("Имя устройства: {:?}", device.name());
                } else {
                    debug!("Устройство {:?} не подходит как тачскрин (имя: {})", device_path, device_name);
                }

                Ok(is_touch)
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                Ok(false)
            }
        }
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
