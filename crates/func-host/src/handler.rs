//! `TrackingExceptionHandler`: concede el periodo de gracia como el handler
//! por defecto y, si el body sigue vivo, lo retiene para inspección.
//!
//! Cada huérfano nuevo dispara un `reap` de los ya terminados, así que el
//! registro no crece sin límite aunque nadie llame a `reap` explícitamente.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use func_core::{ExceptionHandler, OrphanedInvocation};
use log::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct TrackingExceptionHandler {
    orphans: DashMap<Uuid, OrphanedInvocation>,
}

impl TrackingExceptionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Huérfanos retenidos (terminados o no desde que se retuvieron).
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// Ids de las invocaciones retenidas.
    pub fn orphan_ids(&self) -> Vec<Uuid> {
        self.orphans.iter().map(|e| *e.key()).collect()
    }

    /// Descarta los huérfanos que ya terminaron y devuelve cuántos se
    /// descartaron.
    pub fn reap(&self) -> usize {
        let before = self.orphans.len();
        self.orphans.retain(|_, orphan| !orphan.is_finished());
        let reaped = before.saturating_sub(self.orphans.len());
        if reaped > 0 {
            debug!("reaped {reaped} finished orphan invocation(s)");
        }
        reaped
    }
}

#[async_trait]
impl ExceptionHandler for TrackingExceptionHandler {
    async fn on_function_timeout(&self, mut orphan: OrphanedInvocation, grace_period: Duration) {
        if orphan.await_completion(grace_period).await {
            debug!("timed out function '{}' ({}) finished within grace period",
                   orphan.function_name(),
                   orphan.invocation_id());
            return;
        }
        warn!("function '{}' ({}) still running {:?} after timeout; tracking orphan",
              orphan.function_name(),
              orphan.invocation_id(),
              grace_period);
        self.reap();
        self.orphans.insert(orphan.invocation_id(), orphan);
    }
}
