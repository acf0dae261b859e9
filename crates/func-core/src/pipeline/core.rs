//! Core InvocationPipeline implementation
//!
//! Algoritmo "onion" sobre la cadena de N filtros:
//! 1. Pre-phase: `on_executing` de 0..N. El primer error corta la fase (ni
//!    más filtros ni body). `entered` cuenta los pre-hooks que terminaron bien.
//! 2. Body: sólo si `entered == N`, dentro del `TimeoutGuard`.
//! 3. Post-phase: `on_executed` de `entered - 1` hasta 0, estrictamente en
//!    orden inverso. Un error no interrumpe el bucle.
//! 4. El último error cronológico (si existe) se propaga envuelto en un
//!    `InvocationError`; si no, se devuelve el `FunctionResult`.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use log::{debug, error, warn};

use super::aggregator::ExceptionAggregator;
use super::request::InvocationRequest;
use super::timeout::{panic_message, ExceptionHandler, LoggingExceptionHandler, TimeoutGuard};
use crate::constants::DEFAULT_TIMEOUT_GRACE_PERIOD;
use crate::descriptor::{FunctionBody, FunctionDescriptor, TimeoutConfig};
use crate::errors::{FilterPhase, FunctionError, InvocationError};
use crate::event::{ErrorSource, InvocationEventKind, InvocationStatus, NullTraceSink, TraceSink};
use crate::filter::{FilterChain, FilterChainBuilder};
use crate::model::{CancellationSignal, ExecutedContext, ExecutingContext, FunctionResult, InvocationContext};

/// Ejecutor de invocaciones. Sin estado por invocación: puede compartirse
/// (p.ej. en un `Arc`) entre invocaciones concurrentes.
pub struct InvocationPipeline {
    sink: Arc<dyn TraceSink>,
    exception_handler: Arc<dyn ExceptionHandler>,
    debugging: bool,
    default_timeout: Option<TimeoutConfig>,
    grace_period: Duration,
}

impl Default for InvocationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationPipeline {
    /// Pipeline sin trazas persistidas, handler de timeout por defecto y sin
    /// debugger adjunto.
    pub fn new() -> Self {
        Self { sink: Arc::new(NullTraceSink),
               exception_handler: Arc::new(LoggingExceptionHandler),
               debugging: false,
               default_timeout: None,
               grace_period: DEFAULT_TIMEOUT_GRACE_PERIOD }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_exception_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.exception_handler = handler;
        self
    }

    /// Indica si el proceso corre bajo un debugger interactivo.
    pub fn with_debugging(mut self, debugging: bool) -> Self {
        self.debugging = debugging;
        self
    }

    /// Timeout aplicado a descriptores que no declaran uno propio.
    pub fn with_default_timeout(mut self, timeout: Option<TimeoutConfig>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn sink(&self) -> &Arc<dyn TraceSink> {
        &self.sink
    }

    /// Ejecuta una invocación completa del descriptor.
    pub async fn invoke(&self, descriptor: &FunctionDescriptor, request: InvocationRequest) -> Result<FunctionResult, InvocationError> {
        let started = Instant::now();
        let start_time = Utc::now();
        let invocation_id = request.invocation_id;
        let function_name = descriptor.name().to_string();

        self.sink.append_kind(invocation_id,
                              InvocationEventKind::Executing { function_name: function_name.clone(),
                                                               reason: request.reason });

        let ctx = InvocationContext::new(invocation_id, descriptor.id().id.clone(), function_name.clone(), request.arguments);
        ctx.logger().debug(&format!("executing (reason: {})", request.reason));

        // Destino fresco (y filtro instance, si lo hay) para esta invocación.
        let instance = descriptor.instantiate();
        let chain = FilterChainBuilder::build(descriptor, instance.filter.clone());
        let mut errors = ExceptionAggregator::new();

        let executing = ExecutingContext::new(ctx.clone());
        let entered = self.run_pre_phase(&chain, &executing, &mut errors).await;

        let result = if entered == chain.len() {
            self.run_body(descriptor, &instance.body, &ctx, &request.cancellation, start_time, &mut errors)
                .await
        } else {
            debug!("pre-phase aborted at filter {entered} of {}; body skipped for '{function_name}'",
                   chain.len());
            FunctionResult::not_run(invocation_id, start_time)
        };

        let executed = ExecutedContext::new(ctx.clone(), result);
        self.run_post_phase(&chain, entered, &executed, &mut errors).await;

        let elapsed = started.elapsed();
        let outcome = match errors.into_last() {
            Some(last) => Err(InvocationError::new(function_name.clone(), last.error, executed.result().clone())),
            None => Ok(executed.result().clone()),
        };
        let status = if outcome.is_ok() {
            InvocationStatus::Succeeded
        } else {
            InvocationStatus::Failed
        };
        self.sink.append_kind(invocation_id,
                              InvocationEventKind::Executed { function_name,
                                                              status,
                                                              duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX) });
        if let Err(e) = &outcome {
            error!("{e}: {}", e.source);
        }
        outcome
    }

    /// Devuelve cuántos pre-hooks terminaron bien (índices `0..entered`).
    async fn run_pre_phase(&self, chain: &FilterChain, ctx: &ExecutingContext, errors: &mut ExceptionAggregator) -> usize {
        for (index, entry) in chain.entries().iter().enumerate() {
            if let Err(e) = catch_hook_panic(entry.name(), FilterPhase::Before, entry.filter.on_executing(ctx)).await {
                let source = ErrorSource::Filter { index,
                                                   scope: entry.scope,
                                                   name: entry.name().to_string(),
                                                   phase: FilterPhase::Before };
                self.record(ctx, errors, source, e);
                return index;
            }
        }
        chain.len()
    }

    async fn run_body(&self,
                      descriptor: &FunctionDescriptor,
                      body: &Arc<dyn FunctionBody>,
                      ctx: &InvocationContext,
                      outer: &CancellationSignal,
                      start_time: DateTime<Utc>,
                      errors: &mut ExceptionAggregator)
                      -> FunctionResult {
        let timeout = descriptor.timeout().copied().or(self.default_timeout);
        let guard = TimeoutGuard::new(timeout, self.debugging, self.grace_period, self.exception_handler.clone());
        // Señal propia de la invocación: un timeout no cancela la del caller.
        let cancellation = outer.child();

        let outcome = guard.run(body.clone(), ctx.clone(), cancellation).await;

        if outcome.timed_out {
            if let Some(cfg) = guard.enforced() {
                self.sink.append_kind(ctx.invocation_id(),
                                      InvocationEventKind::TimeoutElapsed { timeout_ms: cfg.duration_ms(),
                                                                            throw_on_timeout: cfg.throw_on_timeout });
            }
        }
        if let Err(e) = &outcome.result {
            self.record(ctx, errors, ErrorSource::Body, e.clone());
        }
        FunctionResult::from_body(ctx.invocation_id(), &outcome.result, start_time, outcome.ended_at, outcome.elapsed)
    }

    async fn run_post_phase(&self, chain: &FilterChain, entered: usize, ctx: &ExecutedContext, errors: &mut ExceptionAggregator) {
        for index in (0..entered).rev() {
            let Some(entry) = chain.get(index) else { continue };
            if let Err(e) = catch_hook_panic(entry.name(), FilterPhase::After, entry.filter.on_executed(ctx)).await {
                let source = ErrorSource::Filter { index,
                                                   scope: entry.scope,
                                                   name: entry.name().to_string(),
                                                   phase: FilterPhase::After };
                self.record(ctx, errors, source, e);
            }
        }
    }

    fn record(&self, ctx: &InvocationContext, errors: &mut ExceptionAggregator, source: ErrorSource, error: FunctionError) {
        if let Some(previous) = errors.last() {
            debug!("error from {:?} supersedes previous error: {}", source, previous.error);
        }
        warn!("[{}] {}: {:?} failed: {}", ctx.invocation_id(), ctx.function_name(), source, error);
        self.sink.append_kind(ctx.invocation_id(),
                              InvocationEventKind::ErrorRecorded { source: source.clone(),
                                                                   error: error.clone() });
        errors.record(source, error);
    }
}

/// Ejecuta un hook de filtro convirtiendo un panic en un error de filtro, para
/// que el resto de post-hooks de la cadena se siga ejecutando.
async fn catch_hook_panic<F>(filter: &str, phase: FilterPhase, hook: F) -> Result<(), FunctionError>
    where F: Future<Output = Result<(), FunctionError>>
{
    match AssertUnwindSafe(hook).catch_unwind().await {
        Ok(out) => out,
        Err(payload) => Err(FunctionError::filter(filter, phase, format!("panicked: {}", panic_message(payload)))),
    }
}
