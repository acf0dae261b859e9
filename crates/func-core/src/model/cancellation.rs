//! Señal de cancelación cooperativa.
//!
//! La cancelación es advisoria: el pipeline sólo la señaliza, y únicamente los
//! bodies que la consultan (`is_cancelled`) o la esperan (`cancelled().await`)
//! terminan antes. Nada se aborta por la fuerza.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Señaliza la cancelación. Idempotente.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resuelve cuando se solicita la cancelación (inmediato si ya lo estaba).
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // `wait_for` sólo falla si el sender se suelta; `self` lo mantiene vivo.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Crea una señal hija: se cancela cuando el padre se cancela, pero
    /// cancelar la hija no afecta al padre.
    ///
    /// Requiere un runtime tokio activo para propagar la cancelación del padre.
    pub fn child(&self) -> CancellationSignal {
        let child = CancellationSignal::new();
        if self.is_cancelled() {
            child.cancel();
            return child;
        }
        let parent = self.clone();
        let weak = Arc::downgrade(&child.tx);
        tokio::spawn(async move {
            let mut closed = match weak.upgrade() {
                Some(tx) => tx.subscribe(),
                None => return,
            };
            tokio::select! {
                _ = parent.cancelled() => {
                    if let Some(tx) = weak.upgrade() {
                        tx.send_replace(true);
                    }
                }
                // la hija ya está cancelada: nada que propagar
                _ = closed.wait_for(|c| *c) => {}
            }
        });
        child
    }
}
