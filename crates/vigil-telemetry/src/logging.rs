//! Structured logging helpers.
//!
//! Every alert logged through [`log_alert!`] carries `subsystem` and
//! `severity` fields so alerts from different sources can be filtered apart.

/// Log a security alert with standard fields.
#[macro_export]
macro_rules! log_alert {
    ($level:ident, $alert:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $alert.source(),
            severity = %$alert.severity(),
            $($($field)*,)?
            "{}", $alert.message()
        )
    };
}
