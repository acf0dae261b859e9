//! Tipos de evento de invocación y estructura `InvocationEvent`.
//!
//! Rol en el flujo:
//! - El pipeline emite un `Executing` al comenzar y un `Executed` al terminar.
//! - Entre ambos, cada error (aunque después quede reemplazado por otro más
//!   reciente) se emite como `ErrorRecorded`, de modo que el colaborador de
//!   logging puede auditar todos los fallos de la invocación.
//! - `InvocationEventKind` es el contrato observable del pipeline.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FilterPhase, FunctionError};
use crate::filter::FilterScope;

/// Motivo por el que se disparó la invocación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionReason {
    /// Un listener (cola, blob) detectó trabajo nuevo.
    AutomaticTrigger,
    /// Llamada directa desde el host.
    HostCall,
    /// Re-ejecución manual desde un panel de control.
    Dashboard,
}

impl std::fmt::Display for ExecutionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionReason::AutomaticTrigger => "AutomaticTrigger",
            ExecutionReason::HostCall => "HostCall",
            ExecutionReason::Dashboard => "Dashboard",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Succeeded,
    Failed,
}

/// Origen de un error registrado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSource {
    Filter { index: usize, scope: FilterScope, name: String, phase: FilterPhase },
    Body,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InvocationEventKind {
    /// Inicio de la invocación. Invariante: primer evento de cada invocación.
    Executing { function_name: String, reason: ExecutionReason },
    /// Un error lanzado en cualquier fase. No implica que sea el que se
    /// propaga al caller.
    ErrorRecorded { source: ErrorSource, error: FunctionError },
    /// El guard de timeout venció antes de que terminara el body.
    TimeoutElapsed { timeout_ms: u64, throw_on_timeout: bool },
    /// Cierre de la invocación. `status` es `Failed` si se propagó algún error.
    Executed { function_name: String, status: InvocationStatus, duration_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub seq: u64, // asignado por el sink (orden append por invocación)
    pub invocation_id: Uuid,
    pub kind: InvocationEventKind,
    pub ts: DateTime<Utc>,
}
