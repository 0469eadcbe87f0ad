// crates/greeter-core/src/logging.rs
//
// Logger port shared by the interceptors, use case, and domain services.
// A single instance is built at process start and handed to each component.

use std::fmt;
use std::sync::Arc;

/// Leveled log sink. Implementations must be safe to call from many calls
/// at once without interleaving individual lines.
pub trait Logger: Send + Sync {
    fn info(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
    fn debug(&self, args: fmt::Arguments<'_>);
}

/// Shared logger handle.
pub type SharedLogger = Arc<dyn Logger>;

/// Logger backed by the process-wide `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn shared() -> SharedLogger {
        Arc::new(TracingLogger)
    }
}

impl Logger for TracingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!("{}", args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!("{}", args);
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!("{}", args);
    }
}
