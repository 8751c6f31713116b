use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub gesture: GestureConfig,
    pub control: ControlConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
}

/// Параметры детекции двойного тапа.
/// Значения по умолчанию взяты из типичных драйверов семейства dt2w,
/// все пороги настраиваемые.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GestureConfig {
    /// Максимальный интервал между двумя тапами
    pub time_window_ms: u64,
    /// Максимальное расстояние между тапами по каждой оси ("перо")
    pub feather_px: i32,
    /// Максимальная длительность одиночного тапа
    pub max_tap_duration_ms: u64,
    /// Допустимое смещение пальца внутри одного тапа
    pub tap_slop_px: i32,
    /// Задержка между детекцией жеста и инъекцией клавиши питания
    pub trigger_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Директория с управляющими файлами (аналог sysfs-атрибутов)
    pub directory: String,
    pub polling_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "dt2w_rust=info".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
            },
            gesture: GestureConfig {
                time_window_ms: 500,
                feather_px: 150,
                max_tap_duration_ms: 200,
                tap_slop_px: 30,
                trigger_delay_ms: 50,
            },
            control: ControlConfig {
                directory: "/run/doubletap2wake".to_string(),
                polling_interval_ms: 100,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DT2W_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация параметров жеста
        if self.gesture.time_window_ms == 0 {
            anyhow::bail!("time_window_ms должно быть больше 0");
        }

        if self.gesture.max_tap_duration_ms == 0 {
            anyhow::bail!("max_tap_duration_ms должно быть больше 0");
        }

        if self.gesture.feather_px < 0 {
            anyhow::bail!("feather_px не может быть отрицательным");
        }

        if self.gesture.tap_slop_px < 0 {
            anyhow::bail!("tap_slop_px не может быть отрицательным");
        }

        // Валидация управляющего интерфейса
        if self.control.directory.is_empty() {
            anyhow::bail!("control.directory не может быть пустой");
        }

        if self.control.polling_interval_ms < 10 {
            anyhow::bail!("polling_interval_ms должно быть минимум 10");
        }

        Ok(())
    }

    pub fn time_window(&self) -> Duration {
        Duration::from_millis(self.gesture.time_window_ms)
    }

    pub fn max_tap_duration(&self) -> Duration {
        Duration::from_millis(self.gesture.max_tap_duration_ms)
    }

    pub fn trigger_delay(&self) -> Duration {
        Duration::from_millis(self.gesture.trigger_delay_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.control.polling_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_time_window_rejected() {
        let mut config = Config::default();
        config.gesture.time_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_feather_rejected() {
        let mut config = Config::default();
        config.gesture.feather_px = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_fast_polling_rejected() {
        let mut config = Config::default();
        config.control.polling_interval_ms = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.time_window(), Duration::from_millis(500));
        assert_eq!(config.max_tap_duration(), Duration::from_millis(200));
    }
}
