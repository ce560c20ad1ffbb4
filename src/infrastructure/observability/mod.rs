//! Observability for the model lifecycle binaries: structured logging to stderr.

pub mod logging;

pub use logging::init as init_logging;
