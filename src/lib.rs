// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod pad;
pub mod progress;
pub mod quote;
pub mod quote_generator;
pub mod resize;
pub mod runtime;
pub mod session;
pub mod sources;
pub mod stats;
pub mod timer;
pub mod ui;

pub use error::{Error, Result};
