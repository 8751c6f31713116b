use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{
    create_touch_listener, ControlInterface, GestureDetector, GestureState, VirtualDevice,
    WakeTrigger,
};

const WAKE_LOCK_NAME: &str = "doubletap2wake";

#[derive(Parser, Debug)]
#[command(name = "dt2w-rust")]
#[command(about = "Демон пробуждения устройства двойным касанием экрана")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "dt2w.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    info!("Запуск dt2w-rust v{}", env!("CARGO_PKG_VERSION"));

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Проверка прав доступа
    utils::permissions::check_permissions()?;

    // Источник пробуждения держим на всё время работы демона
    let mut wake_lock = utils::WakeLock::acquire(WAKE_LOCK_NAME);

    // Инициализация компонентов: общее состояние, эмиттер, триггер, детектор
    let state = Arc::new(GestureState::new());
    let virtual_device = Arc::new(VirtualDevice::new("Doubletap2wake Virtual Device", args.dry_run)?);
    let wake_trigger = Arc::new(WakeTrigger::new(virtual_device.clone(), config.trigger_delay()));
    let detector = Arc::new(GestureDetector::new(
        config.clone(),
        state.clone(),
        wake_trigger.clone(),
    ));
    let control_interface = Arc::new(ControlInterface::new(config.clone(), state.clone())?);
    let touch_listener = create_touch_listener(config.clone(), detector.clone(), args.dry_run)?;

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let touch_handle = tokio::spawn(async move {
        if let Err(e) = touch_listener.run().await {
            error!("Ошибка в TouchListener: {}", e);
        }
    });
    let control_for_task = control_interface.clone();
    let control_handle = tokio::spawn(async move {
        if let Err(e) = control_for_task.run().await {
            error!("Ошибка в ControlInterface: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Порядок остановки повторяет выгрузку оригинального драйвера:
    // опрос и слушатель -> управляющие файлы -> отложенная работа ->
    // устройство -> wake lock. Опрос обязан встать до удаления файлов,
    // иначе запоздавший тик воссоздаст их.
    control_handle.abort();
    touch_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = control_handle.await;
        let _ = touch_handle.await;
    }).await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    control_interface.remove_files();

    // Отложенная эмиссия, если она запланирована, обязана доработать
    wake_trigger.shutdown().await;

    drop(virtual_device);
    wake_lock.release();

    info!("dt2w-rust завершил работу");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}
