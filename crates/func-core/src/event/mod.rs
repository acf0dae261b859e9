//! Eventos de traza de invocación y trait TraceSink.

mod sink;
mod types;

pub use sink::{InMemoryTraceSink, NullTraceSink, TraceSink};
pub use types::{ErrorSource, ExecutionReason, InvocationEvent, InvocationEventKind, InvocationStatus};
