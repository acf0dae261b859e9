use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{InvocationEvent, InvocationEventKind};

/// Destino append-only de eventos de traza.
///
/// Se comparte entre invocaciones concurrentes, por eso recibe `&self`.
pub trait TraceSink: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent;
    /// Lista eventos de una invocación (orden ascendente por seq).
    fn list(&self, invocation_id: Uuid) -> Vec<InvocationEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryTraceSink {
    inner: DashMap<Uuid, Vec<InvocationEvent>>,
}

impl InMemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids de todas las invocaciones registradas (sin orden garantizado).
    pub fn invocation_ids(&self) -> Vec<Uuid> {
        self.inner.iter().map(|e| *e.key()).collect()
    }
}

impl TraceSink for InMemoryTraceSink {
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent {
        let mut vec = self.inner.entry(invocation_id).or_default();
        let seq = vec.len() as u64;
        let ev = InvocationEvent { seq,
                                   invocation_id,
                                   kind,
                                   ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, invocation_id: Uuid) -> Vec<InvocationEvent> {
        self.inner.get(&invocation_id).map(|v| v.clone()).unwrap_or_default()
    }
}

/// Sink que descarta todo (para callers sin interés en las trazas).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn append_kind(&self, invocation_id: Uuid, kind: InvocationEventKind) -> InvocationEvent {
        InvocationEvent { seq: 0,
                          invocation_id,
                          kind,
                          ts: Utc::now() }
    }

    fn list(&self, _invocation_id: Uuid) -> Vec<InvocationEvent> {
        Vec::new()
    }
}
