//! Core types shared by the aero error and logging facilities
//!
//! - **Correlation**: `RequestId` tagging each repository call's log lines and errors
//! - **Schema constants**: canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
