//! The result-consumer hook (spec.md §9 "Result consumer as a sink").

use crate::context::CommandContext;

/// Notified after every leaf execution, successful or not.
///
/// Implement this to observe command results (logging, metrics,
/// feedback to the source) without threading extra state through every
/// handler. [`CommandDispatcher::new`](crate::dispatcher::CommandDispatcher::new)
/// registers [`NoopResultConsumer`] by default, so implementing this is
/// opt-in.
pub trait ResultConsumer<S>: Send + Sync {
    /// Called once per source in the final (possibly forked) execution
    /// set, with the context it ran against, whether it succeeded, and
    /// its result (`0` on failure).
    fn on_command_complete(&self, context: &CommandContext<S>, success: bool, result: i32);
}

/// The default consumer: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResultConsumer;

impl<S> ResultConsumer<S> for NoopResultConsumer {
    fn on_command_complete(&self, _context: &CommandContext<S>, _success: bool, _result: i32) {}
}
