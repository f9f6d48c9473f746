//! Test utilities for assetweave
//!
//! Helpers for unit and integration tests: in-memory locators, recording stages and
//! callbacks, and a temporary webapp layout with a model and configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetweave::test_utils::TestWebapp;
//!
//! let webapp = TestWebapp::builder()
//!     .unwrap()
//!     .with_file("js/a.js", "var a = 1;")
//!     .with_group("all", &["/js/a.js"], &[])
//!     .build()
//!     .unwrap();
//! assert!(webapp.model_path().exists());
//! ```

mod doubles;
mod webapp;

pub use doubles::{FailingProcessor, MemoryLocator, RecordingCallback, RecordingProcessor};
pub use webapp::{TestWebapp, TestWebappBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise `RUST_LOG`;
/// without either, logging stays off.
///
/// ```bash
/// RUST_LOG=assetweave=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
