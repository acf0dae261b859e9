use func_core::{FunctionError, InvocationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("function not found: {0}")]
    FunctionNotFound(String),
    #[error("function already registered: {0}")]
    AlreadyRegistered(String),
    /// Error envuelto de una invocación (el último error cronológico).
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    /// La factory del descriptor falló al indexar la función.
    #[error("error indexing function '{name}': {source}")]
    Descriptor {
        name: String,
        #[source]
        source: FunctionError,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl HostError {
    /// Error interno de la invocación, si lo hay.
    pub fn function_error(&self) -> Option<&FunctionError> {
        match self {
            HostError::Invocation(e) => Some(e.inner()),
            HostError::Descriptor { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use func_core::FunctionResult;
    use uuid::Uuid;

    #[test]
    fn invocation_error_is_transparent() {
        let result = FunctionResult::not_run(Uuid::nil(), chrono::Utc::now());
        let inner = InvocationError::new("Echo", FunctionError::body("bad"), result);
        let err: HostError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.function_error(), Some(&FunctionError::body("bad")));
    }

    #[test]
    fn config_variant_format() {
        let err = HostError::Config("FUNCTION_TIMEOUT_SECS".into());
        assert_eq!(err.to_string(), "configuration error: FUNCTION_TIMEOUT_SECS");
        assert!(err.function_error().is_none());
    }
}
