//! Narrow leveled-logging capability used by the request loop.
//!
//! The loop never logs directly; it goes through a [`Logging`] sink that the
//! caller can swap out. [`TracingLogger`] is the default and forwards each
//! level to the matching `tracing` macro; [`NoopLogger`] discards everything.

/// A leveled logging sink.
///
/// Implementations receive fully formatted messages; the request loop tags
/// every entry with the HTTP method and target URL before handing it over.
pub trait Logging: Send + Sync {
    /// Record a terminal failure.
    fn error(&self, message: &str);

    /// Record a noteworthy but non-terminal event.
    fn warn(&self, message: &str);

    /// Record routine progress.
    fn info(&self, message: &str);

    /// Record fine-grained detail such as inter-attempt delays.
    fn debug(&self, message: &str);
}

/// Forwards each level to the corresponding `tracing` macro.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logging for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logging for NoopLogger {
    fn error(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loggers_are_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingLogger>();
        assert_send_sync::<NoopLogger>();
    }

    #[test]
    fn noop_logger_accepts_all_levels() {
        let logger = NoopLogger;
        logger.error("e");
        logger.warn("w");
        logger.info("i");
        logger.debug("d");
    }
}
