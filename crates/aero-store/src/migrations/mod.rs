//! Migration framework
//!
//! - Embedded SQL migrations, applied in order
//! - SHA-256 checksums recorded per migration and verified on every run
//! - Idempotent re-application

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::{applied_migrations, apply_migrations};
