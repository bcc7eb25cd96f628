//! Operation boundary shared by repository implementations

use std::fmt::Debug;
use std::time::Instant;

use aero_core_types::RequestId;

use crate::errors::Result;
use crate::{log_op_end, log_op_error, log_op_start};

/// Run `f` as the boundary of `op` on `entity`
///
/// Each call gets a fresh `RequestId`. It is logged on the `start` event and
/// on the single `end` or `end_error` event, and attached to the returned
/// error. `backend` names the repository implementation (`memory`, `sqlite`).
///
/// # Errors
///
/// Whatever `f` returns, tagged with the request id.
pub fn observe<T>(
    backend: &'static str,
    entity: &'static str,
    op: &'static str,
    key: Option<&dyn Debug>,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let request_id = RequestId::new();
    log_op_start!(op, backend = backend, entity = entity, key = ?key, request_id = %request_id);
    let start = Instant::now();

    match f() {
        Ok(value) => {
            log_op_end!(
                op,
                duration_ms = start.elapsed().as_millis() as u64,
                backend = backend,
                entity = entity,
                request_id = %request_id
            );
            Ok(value)
        }
        Err(err) => {
            let err = err.with_request_id(request_id.clone());
            log_op_error!(
                op,
                &err,
                duration_ms = start.elapsed().as_millis() as u64,
                backend = backend,
                entity = entity,
                request_id = %request_id
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{StorageError, StorageErrorKind};
    use crate::logging_facility::init_test_capture;
    use aero_core_types::schema::{
        EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_BACKEND, FIELD_ERR_KIND, FIELD_REQUEST_ID,
    };

    #[test]
    fn test_start_and_end_share_request_id() {
        let capture = init_test_capture();
        let op = "boundary_unit_ok";

        let value = observe("memory", "authority", op, None, || Ok(3)).unwrap();
        assert_eq!(value, 3);

        let starts = capture.events_for(op, EVENT_START);
        let ends = capture.events_for(op, EVENT_END);
        assert_eq!(starts.len(), 1);
        assert_eq!(ends.len(), 1);
        assert!(starts[0].field(FIELD_REQUEST_ID).is_some());
        assert_eq!(
            starts[0].field(FIELD_REQUEST_ID),
            ends[0].field(FIELD_REQUEST_ID)
        );
        assert_eq!(ends[0].field(FIELD_BACKEND), Some("memory"));
    }

    #[test]
    fn test_error_carries_logged_request_id() {
        let capture = init_test_capture();
        let op = "boundary_unit_err";

        let err = observe::<()>("sqlite", "authority", op, None, || {
            Err(StorageError::timeout(op, 10))
        })
        .unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::Timeout);
        let id = err.request_id().expect("request id attached");

        let errors = capture.events_for(op, EVENT_END_ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(FIELD_REQUEST_ID), Some(id.as_str()));
        assert_eq!(errors[0].field(FIELD_ERR_KIND), Some("Timeout"));
        assert!(err.to_string().contains(id.as_str()));
    }
}
