pub mod device_finder;
pub mod permissions;
pub mod wake_lock;

pub use device_finder::DeviceFinder;
pub use wake_lock::WakeLock;

// ✅ Макросы условного логирования для оптимизации производительности
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
