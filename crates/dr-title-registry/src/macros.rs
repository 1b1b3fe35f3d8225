//! Logging helpers shared by the engine.

/// Logs a workflow operation with the standard property fields.
///
/// ```rust,ignore
/// log_transition!(info, "approve_registration_docs", property_id, caller, "Transition committed");
/// log_transition!(warn, "finalize_registration", property_id, caller, "Operation rejected", kind = "state");
/// ```
macro_rules! log_transition {
    ($level:ident, $operation:expr, $property_id:expr, $caller:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            operation = $operation,
            property_id = %$property_id,
            caller = %$caller,
            $($($field)*,)?
            $msg
        )
    };
}

pub(crate) use log_transition;
