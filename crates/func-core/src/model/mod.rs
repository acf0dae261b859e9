//! Modelos de la invocación (argumentos, property bag, contextos, resultado,...)

pub mod arguments;
pub mod cancellation;
pub mod context;
pub mod logger;
pub mod properties;
pub mod result;

pub use arguments::ArgumentSnapshot;
pub use cancellation::CancellationSignal;
pub use context::{ExecutedContext, ExecutingContext, InvocationContext};
pub use logger::InvocationLogger;
pub use properties::PropertyBag;
pub use result::FunctionResult;
