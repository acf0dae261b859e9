//! `FunctionHost`: registro de funciones + puntos de entrada.
//!
//! Flujo de `trigger`:
//! 1. Busca la definición por nombre (`FunctionNotFound` si no existe).
//! 2. Obtiene el descriptor (construido una sola vez, en la primera llamada).
//! 3. Ejecuta la invocación en el `InvocationPipeline` compartido.
//! 4. Devuelve el `FunctionResult` o el único error envuelto.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;
use func_core::{ArgumentSnapshot, CancellationSignal, ExceptionHandler, ExecutionReason, FunctionDescriptor, FunctionResult, InvocationPipeline,
                InvocationRequest, TraceSink};
use log::info;

use crate::config::HostConfig;
use crate::definition::FunctionDefinition;
use crate::error::HostError;

// Runtime de `call_blocking`, compartido por todo el proceso y nunca liberado:
// los bodies huérfanos tras un timeout siguen corriendo en sus workers.
static BLOCKING_RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn blocking_runtime() -> Result<&'static Runtime, HostError> {
    Ok(BLOCKING_RUNTIME.get_or_try_init(|| {
                           tokio::runtime::Builder::new_multi_thread().thread_name("func-host-blocking")
                                                                      .enable_all()
                                                                      .build()
                       })?)
}

pub struct FunctionHost {
    config: HostConfig,
    functions: DashMap<String, Arc<FunctionDefinition>>,
    pipeline: InvocationPipeline,
}

impl FunctionHost {
    pub fn new(config: HostConfig) -> Self {
        let pipeline = InvocationPipeline::new().with_debugging(config.debugging)
                                                .with_default_timeout(config.default_timeout)
                                                .with_grace_period(config.grace_period);
        Self { config,
               functions: DashMap::new(),
               pipeline }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.pipeline = self.pipeline.with_sink(sink);
        self
    }

    pub fn with_exception_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.pipeline = self.pipeline.with_exception_handler(handler);
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn sink(&self) -> &Arc<dyn TraceSink> {
        self.pipeline.sink()
    }

    /// Registra una función. Falla si ya existe otra con el mismo nombre.
    pub fn register(&self, definition: FunctionDefinition) -> Result<(), HostError> {
        match self.functions.entry(definition.name().to_string()) {
            Entry::Occupied(e) => Err(HostError::AlreadyRegistered(e.key().clone())),
            Entry::Vacant(e) => {
                info!("registered function '{}'", definition.name());
                e.insert(Arc::new(definition));
                Ok(())
            }
        }
    }

    /// Nombres registrados, ordenados.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Descriptor de una función registrada (lo construye si hace falta).
    pub fn descriptor(&self, name: &str) -> Result<Arc<FunctionDescriptor>, HostError> {
        // se clona el Arc para no retener el guard del DashMap durante la factory
        let definition = self.functions
                             .get(name)
                             .map(|e| e.value().clone())
                             .ok_or_else(|| HostError::FunctionNotFound(name.to_string()))?;
        definition.descriptor().map_err(|source| HostError::Descriptor { name: name.to_string(),
                                                                         source })
    }

    /// Invocación directa desde el host (`ExecutionReason::HostCall`).
    pub async fn call(&self, name: &str, arguments: ArgumentSnapshot) -> Result<FunctionResult, HostError> {
        self.trigger(name, arguments, ExecutionReason::HostCall, CancellationSignal::new())
            .await
    }

    /// Invocación con motivo y señal de cancelación explícitos (listeners,
    /// dashboard).
    pub async fn trigger(&self,
                         name: &str,
                         arguments: ArgumentSnapshot,
                         reason: ExecutionReason,
                         cancellation: CancellationSignal)
                         -> Result<FunctionResult, HostError> {
        let descriptor = self.descriptor(name)?;
        let request = InvocationRequest::new(arguments).with_reason(reason)
                                                       .with_cancellation(cancellation);
        Ok(self.pipeline.invoke(&descriptor, request).await?)
    }

    /// Punto de entrada bloqueante sobre un runtime multi-thread del proceso
    /// que sobrevive a la llamada, de modo que un body huérfano no se cancela
    /// al volver. No debe llamarse desde dentro de un runtime tokio.
    pub fn call_blocking(&self, name: &str, arguments: ArgumentSnapshot) -> Result<FunctionResult, HostError> {
        blocking_runtime()?.block_on(self.call(name, arguments))
    }
}

impl Default for FunctionHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}
