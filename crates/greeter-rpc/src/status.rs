// crates/greeter-rpc/src/status.rs
//
// Mapping from domain errors to gRPC status codes.

use tonic::Status;

use greeter_core::GreeterError;

/// Classify a use-case error for the wire.
///
/// Only validation, cancellation, and deadline errors get a dedicated code;
/// policy rejections and dependency failures are reported as INTERNAL.
pub fn status_from_error(err: &GreeterError) -> Status {
    match err {
        GreeterError::Validation(_) => Status::invalid_argument(err.to_string()),
        GreeterError::Cancelled => Status::cancelled(err.to_string()),
        GreeterError::DeadlineExceeded => Status::deadline_exceeded(err.to_string()),
        GreeterError::NotAllowed | GreeterError::Dependency(_) => Status::internal(format!(
            "failed to process greeting request: {}",
            err
        )),
    }
}
