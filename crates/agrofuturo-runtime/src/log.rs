//! Quiet-mode aware logging. With AGROFUTURO_QUIET=1, routine step logs are suppressed.
//! Uses `tracing::info!` so output is captured by the tracing subscriber.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    agrofuturo_core::config::ObservabilityConfig::from_env().quiet
}
