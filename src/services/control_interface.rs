use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{Dt2wError, Result};
use crate::services::GestureState;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const ENABLE_FILE: &str = "doubletap2wake_enable";
pub const X_COORD_FILE: &str = "doubletap2wake_x_coord";
pub const Y_COORD_FILE: &str = "doubletap2wake_y_coord";

/// Права на управляющие файлы, как у sysfs-атрибутов оригинального драйвера
const CONTROL_FILE_MODE: u32 = 0o664;

/// Последние значения, синхронизированные с файлами.
/// Расхождение файла с ними - внешняя запись, расхождение
/// состояния с ними - обновление со стороны демона.
#[derive(Debug, Clone, Copy)]
struct SyncedValues {
    enable: i64,
    x_coord: i32,
    y_coord: i32,
}

/// Файловый управляющий интерфейс: три файла с десятичными значениями,
/// завершёнными переводом строки. Внешние записи подхватываются опросом;
/// неверное значение отклоняется - в файл возвращается прежнее.
pub struct ControlInterface {
    state: Arc<GestureState>,
    directory: PathBuf,
    polling_interval: Duration,
    synced: Mutex<SyncedValues>,
    removed: AtomicBool,
}

impl ControlInterface {
    pub fn new(config: Arc<Config>, state: Arc<GestureState>) -> Result<Self> {
        let directory = PathBuf::from(&config.control.directory);
        info!("Инициализация ControlInterface в {:?}", directory);

        fs::create_dir_all(&directory).map_err(|e| {
            Dt2wError::Permission(format!(
                "Не удалось создать директорию {:?}: {}",
                directory, e
            ))
        })?;

        let interface = Self {
            state,
            directory,
            polling_interval: config.polling_interval(),
            synced: Mutex::new(SyncedValues {
                enable: 0,
                x_coord: 0,
                y_coord: 0,
            }),
            removed: AtomicBool::new(false),
        };

        if let Err(e) = interface.init_files() {
            // Директория без файлов тоже не должна оставаться висеть
            let _ = fs::remove_dir(&interface.directory);
            return Err(e);
        }

        info!("Управляющие файлы созданы");
        Ok(interface)
    }

    /// Создать управляющие файлы с нулевыми значениями.
    /// При частичной неудаче уже созданные файлы удаляются,
    /// чтобы не оставлять хвостов после неудачного старта.
    fn init_files(&self) -> Result<()> {
        let mut created: Vec<PathBuf> = Vec::new();

        for name in [ENABLE_FILE, X_COORD_FILE, Y_COORD_FILE] {
            let path = self.directory.join(name);

            if let Err(e) = Self::create_control_file(&path) {
                error!("Не удалось создать управляющий файл {:?}: {}", path, e);
                for p in &created {
                    if let Err(e) = fs::remove_file(p) {
                        warn!("Не удалось удалить {:?} при откате: {}", p, e);
                    }
                }
                return Err(e);
            }

            created.push(path);
        }

        Ok(())
    }

    fn create_control_file(path: &Path) -> Result<()> {
        fs::write(path, "0\n")?;
        fs::set_permissions(path, fs::Permissions::from_mode(CONTROL_FILE_MODE))?;
        Ok(())
    }

    /// Цикл опроса управляющих файлов
    pub async fn run(&self) -> Result<()> {
        info!(
            "ControlInterface запущен (интервал опроса: {}мс)",
            self.polling_interval.as_millis()
        );

        loop {
            if let Err(e) = self.poll_once() {
                error!("Ошибка опроса управляющих файлов: {}", e);
            }

            tokio::time::sleep(self.polling_interval).await;
        }
    }

    /// Один проход синхронизации файлов и состояния
    fn poll_once(&self) -> Result<()> {
        self.sync_enable()?;
        self.sync_x_coord()?;
        self.sync_y_coord()?;
        Ok(())
    }

    fn sync_enable(&self) -> Result<()> {
        let path = self.directory.join(ENABLE_FILE);
        let mut synced = self.synced.lock();

        match Self::read_value::<i64>(&path) {
            Ok(file_value) if file_value != synced.enable => {
                // Внешняя запись: применяем с валидацией
                match self.state.set_enabled_raw(file_value) {
                    Ok(()) => {
                        info!("doubletap2wake_enable = {}", file_value);
                        // Нормализуем содержимое до "N\n"
                        Self::write_value(&path, file_value)?;
                        synced.enable = file_value;
                    }
                    Err(e) => {
                        error!("Запись в {} отклонена: {}", ENABLE_FILE, e);
                        Self::write_value(&path, synced.enable)?;
                    }
                }
            }
            Ok(_) => {
                // Файл совпадает с последним синхронизированным значением;
                // подтягиваем возможное изменение состояния со стороны демона
                let state_value = self.state.enabled() as i64;
                if state_value != synced.enable {
                    Self::write_value(&path, state_value)?;
                    synced.enable = state_value;
                }
            }
            Err(Dt2wError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                // Файл уже убран (остановка демона) - не воссоздаём его
                debug_if_enabled!("{} отсутствует, синхронизация пропущена", ENABLE_FILE);
            }
            Err(e) => {
                error!("Неверное содержимое {}: {}", ENABLE_FILE, e);
                Self::write_value(&path, synced.enable)?;
            }
        }

        Ok(())
    }

    fn sync_x_coord(&self) -> Result<()> {
        let path = self.directory.join(X_COORD_FILE);
        let mut synced = self.synced.lock();

        let state_value = self.state.x_coord();
        synced.x_coord = Self::sync_coord(&path, X_COORD_FILE, synced.x_coord, state_value, |v| {
            self.state.set_x_coord(v)
        })?;

        Ok(())
    }

    fn sync_y_coord(&self) -> Result<()> {
        let path = self.directory.join(Y_COORD_FILE);
        let mut synced = self.synced.lock();

        let state_value = self.state.y_coord();
        synced.y_coord = Self::sync_coord(&path, Y_COORD_FILE, synced.y_coord, state_value, |v| {
            self.state.set_y_coord(v)
        })?;

        Ok(())
    }

    /// Синхронизация координатного файла: принимает любое целое,
    /// нечитаемое содержимое заменяется прежним значением
    fn sync_coord(
        path: &Path,
        name: &str,
        last_synced: i32,
        state_value: i32,
        apply: impl FnOnce(i32),
    ) -> Result<i32> {
        match Self::read_value::<i32>(path) {
            Ok(file_value) if file_value != last_synced => {
                debug_if_enabled!("{} = {} (внешняя запись)", name, file_value);
                apply(file_value);
                // Нормализуем содержимое до "N\n"
                Self::write_value(path, file_value)?;
                Ok(file_value)
            }
            Ok(_) => {
                if state_value != last_synced {
                    // Детектор обновил координату последнего тапа
                    Self::write_value(path, state_value)?;
                    Ok(state_value)
                } else {
                    Ok(last_synced)
                }
            }
            Err(Dt2wError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                // Файл уже убран (остановка демона) - не воссоздаём его
                debug_if_enabled!("{} отсутствует, синхронизация пропущена", name);
                Ok(last_synced)
            }
            Err(e) => {
                error!("Неверное содержимое {}: {}", name, e);
                Self::write_value(path, last_synced)?;
                Ok(last_synced)
            }
        }
    }

    fn read_value<T: std::str::FromStr>(path: &Path) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let content = fs::read_to_string(path)?;
        content
            .trim()
            .parse::<T>()
            .map_err(|e| Dt2wError::InvalidValue(format!("{:?}: {}", path, e)))
    }

    fn write_value<T: std::fmt::Display>(path: &Path, value: T) -> Result<()> {
        fs::write(path, format!("{}\n", value))?;
        Ok(())
    }

    /// Убрать управляющие файлы (аналог удаления sysfs-группы).
    /// Вызывается при остановке демона до освобождения остальных ресурсов;
    /// повторные вызовы ничего не делают.
    pub fn remove_files(&self) {
        if self.removed.swap(true, Ordering::SeqCst) {
            return;
        }

        for name in [ENABLE_FILE, X_COORD_FILE, Y_COORD_FILE] {
            let path = self.directory.join(name);
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Не удалось удалить управляющий файл {:?}: {}", path, e);
                }
            }
        }

        // Пустую директорию тоже убираем (аналог kobject_put)
        let _ = fs::remove_dir(&self.directory);

        info!("Управляющие файлы удалены");
    }
}

impl Drop for ControlInterface {
    fn drop(&mut self) {
        // Неудачный старт одного из следующих компонентов не должен
        // оставлять файлы на диске
        self.remove_files();
    }
}
