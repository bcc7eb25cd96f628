//! Structured logging facility
//!
//! - Single initialization point via `init(profile)`
//! - Operation boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - `observe`, the per-operation boundary with a fresh `RequestId`
//! - Test capture mode for deterministic assertions
//!
//! Repository implementations own the boundary of each public operation:
//! one `start` event on entry and exactly one `end` or `end_error` on exit.
//! Helpers underneath use plain `tracing::debug!`.
//!
//! ```rust
//! use aero_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod boundary;
pub mod init;
pub mod macros;
pub mod test_capture;

pub use boundary::observe;
pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
