use func_core::FunctionError;
use func_host::HostError;
use thiserror::Error;

/// Errores de la aplicación demo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error del host: {0}")]
    Host(#[from] HostError),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Error de función que causó el fallo, si lo hubo.
    pub fn function_error(&self) -> Option<&FunctionError> {
        match self {
            AppError::Host(h) => h.function_error(),
            _ => None,
        }
    }
}
