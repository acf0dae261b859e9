//! Errores del núcleo de invocación.
//!
//! `FunctionError` es el error "crudo" producido por un filtro, el body o el
//! guard de timeout. Es `Clone` + serde para poder vivir a la vez en el
//! `FunctionResult`, en los eventos de traza y en el agregador.
//! `InvocationError` es el único error envuelto que ve el caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::FunctionResult;

/// Fase del pipeline en la que se originó un error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterPhase {
    /// Hook previo (`on_executing`).
    Before,
    /// Hook posterior (`on_executed`).
    After,
}

impl std::fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterPhase::Before => write!(f, "before"),
            FilterPhase::After => write!(f, "after"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FunctionError {
    #[error("filter '{filter}' failed in {phase} hook: {message}")]
    Filter { filter: String, phase: FilterPhase, message: String },
    #[error("function body failed: {0}")]
    Body(String),
    #[error("function body panicked: {0}")]
    BodyPanicked(String),
    #[error("invocation of '{function_name}' was cancelled")]
    Cancelled { function_name: String },
    #[error("timeout value of {timeout_ms}ms exceeded by function '{function_name}'")]
    Timeout { function_name: String, timeout_ms: u64 },
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl FunctionError {
    /// Atajo para errores de body con mensaje libre.
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }

    /// Atajo para errores lanzados dentro de un hook de filtro.
    pub fn filter(filter: impl Into<String>, phase: FilterPhase, message: impl Into<String>) -> Self {
        Self::Filter { filter: filter.into(),
                       phase,
                       message: message.into() }
    }

    /// `true` para el error de timeout dedicado (`throw_on_timeout = true`).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// `true` para errores con sabor a cancelación (timeout sin throw, o
    /// body que observó la señal de cancelación).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Error envuelto que se entrega al caller del punto de entrada. El `source`
/// es el error más reciente en orden cronológico de la invocación; `result`
/// conserva el resultado del body (éxito, salida, duración) aunque el fallo
/// venga de un filtro.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("exception while executing function '{function_name}' (invocation {invocation_id})")]
pub struct InvocationError {
    pub invocation_id: Uuid,
    pub function_name: String,
    #[source]
    pub source: FunctionError,
    pub result: FunctionResult,
}

impl InvocationError {
    pub fn new(function_name: impl Into<String>, source: FunctionError, result: FunctionResult) -> Self {
        Self { invocation_id: result.invocation_id,
               function_name: function_name.into(),
               source,
               result }
    }

    /// Error interno que ganó la agregación.
    pub fn inner(&self) -> &FunctionError {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_error_display_names_filter_and_phase() {
        let e = FunctionError::filter("audit", FilterPhase::After, "boom");
        assert_eq!(e.to_string(), "filter 'audit' failed in after hook: boom");
    }

    #[test]
    fn invocation_error_exposes_inner_cause() {
        let id = Uuid::new_v4();
        let result = FunctionResult::not_run(id, chrono::Utc::now());
        let err = InvocationError::new("ProcessOrder", FunctionError::body("bad order"), result);
        assert_eq!(err.invocation_id, id);
        assert_eq!(err.inner(), &FunctionError::Body("bad order".into()));
        assert!(err.to_string().contains("ProcessOrder"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
