//! `TimeoutGuard`: envuelve SOLO el paso del body.
//!
//! - Sin timeout configurado, o con debugger adjunto y
//!   `enforce_while_debugging = false`, el guard es un passthrough.
//! - Con timeout activo, el body corre en una tarea desacoplada y compite con
//!   un temporizador. Si vence el temporizador: se señaliza la cancelación, se
//!   entrega la tarea huérfana al `ExceptionHandler` junto con el periodo de
//!   gracia, y el resultado es un error de timeout (`throw_on_timeout`) o de
//!   cancelación.
//! - La tarea huérfana nunca se aborta: si el body ignora la cancelación sigue
//!   corriendo en segundo plano.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use uuid::Uuid;

use crate::descriptor::{FunctionBody, TimeoutConfig};
use crate::errors::FunctionError;
use crate::model::{CancellationSignal, InvocationContext};

type BodyOutput = Result<Value, FunctionError>;

/// Ejecución del body que siguió viva después de vencer el timeout.
#[derive(Debug)]
pub struct OrphanedInvocation {
    invocation_id: Uuid,
    function_name: String,
    handle: Option<JoinHandle<BodyOutput>>,
    completed: Option<BodyOutput>,
}

impl OrphanedInvocation {
    pub(crate) fn new(invocation_id: Uuid, function_name: impl Into<String>, handle: JoinHandle<BodyOutput>) -> Self {
        Self { invocation_id,
               function_name: function_name.into(),
               handle: Some(handle),
               completed: None }
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// `true` si la tarea ya terminó (con o sin éxito).
    pub fn is_finished(&self) -> bool {
        self.completed.is_some() || self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Espera como mucho `limit` a que el body termine. Devuelve `true` si
    /// terminó. No aborta la tarea en ningún caso.
    pub async fn await_completion(&mut self, limit: Duration) -> bool {
        if self.completed.is_some() {
            return true;
        }
        let Some(handle) = self.handle.as_mut() else {
            return true;
        };
        match tokio::time::timeout(limit, handle).await {
            Ok(joined) => {
                self.completed = Some(map_join(joined));
                self.handle = None;
                true
            }
            Err(_) => false,
        }
    }

    /// Salida del body si ya se observó su finalización.
    pub fn output(&self) -> Option<&BodyOutput> {
        self.completed.as_ref()
    }
}

/// Colaborador externo que recibe las ejecuciones huérfanas por timeout.
#[async_trait]
pub trait ExceptionHandler: Send + Sync {
    /// Se llama al vencer el timeout. El pipeline espera a que este método
    /// retorne antes de finalizar la invocación.
    async fn on_function_timeout(&self, orphan: OrphanedInvocation, grace_period: Duration);
}

/// Handler por defecto: concede el periodo de gracia y, si el body sigue
/// vivo, lo deja desacoplado con un warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExceptionHandler;

#[async_trait]
impl ExceptionHandler for LoggingExceptionHandler {
    async fn on_function_timeout(&self, mut orphan: OrphanedInvocation, grace_period: Duration) {
        if orphan.await_completion(grace_period).await {
            debug!("timed out function '{}' ({}) finished within grace period",
                   orphan.function_name(),
                   orphan.invocation_id());
        } else {
            warn!("function '{}' ({}) still running {:?} after timeout; left detached",
                  orphan.function_name(),
                  orphan.invocation_id(),
                  grace_period);
        }
    }
}

/// Resultado del paso del body tal como lo ve el pipeline.
///
/// `elapsed` y `ended_at` se toman al terminar el body o al vencer el
/// temporizador, antes de la espera de gracia del `ExceptionHandler`.
#[derive(Debug)]
pub struct GuardOutcome {
    pub result: BodyOutput,
    pub timed_out: bool,
    pub elapsed: Duration,
    pub ended_at: DateTime<Utc>,
}

impl GuardOutcome {
    fn finished(result: BodyOutput, timed_out: bool, started: Instant) -> Self {
        Self { result,
               timed_out,
               elapsed: started.elapsed(),
               ended_at: Utc::now() }
    }
}

pub struct TimeoutGuard {
    config: Option<TimeoutConfig>,
    debugging: bool,
    grace_period: Duration,
    handler: Arc<dyn ExceptionHandler>,
}

impl TimeoutGuard {
    pub fn new(config: Option<TimeoutConfig>, debugging: bool, grace_period: Duration, handler: Arc<dyn ExceptionHandler>) -> Self {
        Self { config,
               debugging,
               grace_period,
               handler }
    }

    /// Config efectiva, o `None` si el guard actúa como passthrough.
    pub fn enforced(&self) -> Option<&TimeoutConfig> {
        self.config
            .as_ref()
            .filter(|cfg| !cfg.duration.is_zero())
            .filter(|cfg| !self.debugging || cfg.enforce_while_debugging)
    }

    pub async fn run(&self, body: Arc<dyn FunctionBody>, ctx: InvocationContext, cancellation: CancellationSignal) -> GuardOutcome {
        let invocation_id = ctx.invocation_id();
        let function_name = ctx.function_name().to_string();
        let body_signal = if body.accepts_cancellation() {
            cancellation.clone()
        } else {
            CancellationSignal::new()
        };
        let started = Instant::now();
        let mut handle = tokio::spawn(async move { body.invoke(ctx, body_signal).await });

        let Some(cfg) = self.enforced().copied() else {
            return GuardOutcome::finished(map_join((&mut handle).await), false, started);
        };

        tokio::select! {
            joined = &mut handle => GuardOutcome::finished(map_join(joined), false, started),
            _ = tokio::time::sleep(cfg.duration) => {
                warn!("timeout value of {:?} exceeded by function '{}' ({}); signalling cancellation",
                      cfg.duration, function_name, invocation_id);
                let error = if cfg.throw_on_timeout {
                    FunctionError::Timeout { function_name: function_name.clone(), timeout_ms: cfg.duration_ms() }
                } else {
                    FunctionError::Cancelled { function_name: function_name.clone() }
                };
                let outcome = GuardOutcome::finished(Err(error), true, started);
                cancellation.cancel();
                let orphan = OrphanedInvocation::new(invocation_id, function_name, handle);
                self.handler.on_function_timeout(orphan, self.grace_period).await;
                outcome
            }
        }
    }
}

fn map_join(joined: Result<BodyOutput, JoinError>) -> BodyOutput {
    match joined {
        Ok(out) => out,
        Err(e) if e.is_panic() => Err(FunctionError::BodyPanicked(panic_message(e.into_panic()))),
        Err(e) => Err(FunctionError::Internal(format!("body task failed: {e}"))),
    }
}

/// Texto de un payload de panic (`&str` o `String`).
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
