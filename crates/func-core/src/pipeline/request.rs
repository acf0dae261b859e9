use uuid::Uuid;

use crate::event::ExecutionReason;
use crate::model::{ArgumentSnapshot, CancellationSignal};

/// Datos de una invocación concreta entregados por el colaborador de
/// triggering: argumentos ya resueltos, motivo y señal de cancelación externa.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub invocation_id: Uuid,
    pub arguments: ArgumentSnapshot,
    pub reason: ExecutionReason,
    pub cancellation: CancellationSignal,
}

impl InvocationRequest {
    pub fn new(arguments: ArgumentSnapshot) -> Self {
        Self { invocation_id: Uuid::new_v4(),
               arguments,
               reason: ExecutionReason::HostCall,
               cancellation: CancellationSignal::new() }
    }

    pub fn with_invocation_id(mut self, invocation_id: Uuid) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    pub fn with_reason(mut self, reason: ExecutionReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = cancellation;
        self
    }
}
