use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::FunctionError;

/// Resultado de una invocación.
///
/// `succeeded` y `exception` reflejan SOLO el resultado del body: un filtro
/// que falla no cambia estos campos (su error se reporta por separado a
/// través del `InvocationError` y de los eventos de traza).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub invocation_id: Uuid,
    pub succeeded: bool,
    pub exception: Option<FunctionError>,
    /// Valor devuelto por el body cuando terminó bien.
    pub output: Option<Value>,
    pub duration: Duration,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl FunctionResult {
    /// Resultado de una invocación cuyo body nunca llegó a ejecutarse
    /// (un pre-hook falló). Se considera no exitoso, sin excepción de body.
    pub fn not_run(invocation_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self { invocation_id,
               succeeded: false,
               exception: None,
               output: None,
               duration: Duration::ZERO,
               start_time,
               end_time: start_time }
    }

    pub(crate) fn from_body(invocation_id: Uuid,
                            outcome: &Result<Value, FunctionError>,
                            start_time: DateTime<Utc>,
                            end_time: DateTime<Utc>,
                            duration: Duration)
                            -> Self {
        let (succeeded, output, exception) = match outcome {
            Ok(v) => (true, Some(v.clone()), None),
            Err(e) => (false, None, Some(e.clone())),
        };
        Self { invocation_id,
               succeeded,
               exception,
               output,
               duration,
               start_time,
               end_time }
    }
}
