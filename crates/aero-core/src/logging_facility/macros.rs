//! Operation boundary macros

/// Log the start of an operation
///
/// ```
/// # use aero_core::log_op_start;
/// log_op_start!("save");
/// log_op_start!("save", entity = "authority", key = "A1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use aero_core::log_op_end;
/// log_op_end!("count", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log a failed operation with the error's kind and code
///
/// ```
/// # use aero_core::log_op_error;
/// # use aero_core::errors::StorageError;
/// let err = StorageError::timeout("save", 100);
/// log_op_error!("save", &err, duration_ms = 100);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err: &$crate::errors::StorageError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            error = %err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err: &$crate::errors::StorageError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::aero_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            error = %err,
            $($field)*
        );
    }};
}
