//! Pipeline de invocación: pre-hooks, body bajo el guard de timeout,
//! post-hooks en orden inverso y agregación del último error.

pub mod aggregator;
pub mod core;
pub mod request;
pub mod timeout;

pub use aggregator::{ExceptionAggregator, RecordedError};
pub use self::core::InvocationPipeline;
pub use request::InvocationRequest;
pub use timeout::{ExceptionHandler, GuardOutcome, LoggingExceptionHandler, OrphanedInvocation, TimeoutGuard};
