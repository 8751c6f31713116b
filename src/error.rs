use thiserror::Error;

#[derive(Error, Debug)]
pub enum Dt2wError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Неверное значение: {0}")]
    InvalidValue(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl Dt2wError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(Dt2wError::DeviceNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, Dt2wError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! dt2w_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::Dt2wError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::Dt2wError::Permission(format!($($arg)*))
    };
    (invalid_value, $($arg:tt)*) => {
        $crate::error::Dt2wError::InvalidValue(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::Dt2wError::Internal(format!($($arg)*))
    };
}
