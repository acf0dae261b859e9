use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::FunctionError;
use crate::filter::InvocationFilter;
use crate::model::{CancellationSignal, InvocationContext};

/// Unidad de trabajo invocada por el pipeline.
///
/// Recibe el contexto por valor (handles baratos) porque, con timeout
/// activo, el body corre en una tarea desacoplada que puede sobrevivir a la
/// propia invocación.
#[async_trait]
pub trait FunctionBody: Send + Sync {
    async fn invoke(&self, ctx: InvocationContext, cancellation: CancellationSignal) -> Result<Value, FunctionError>;

    /// `false` si el body no recibe la señal de cancelación: en ese caso se le
    /// entrega una señal que nunca se activa.
    fn accepts_cancellation(&self) -> bool {
        true
    }
}

/// Body declarado como closure async.
pub struct FnBody<F> {
    f: F,
    accepts_cancellation: bool,
}

impl<F, Fut> FnBody<F>
    where F: Fn(InvocationContext, CancellationSignal) -> Fut + Send + Sync + 'static,
          Fut: Future<Output = Result<Value, FunctionError>> + Send + 'static
{
    pub fn new(f: F) -> Self {
        Self { f,
               accepts_cancellation: true }
    }

    /// Marca el body como ajeno a la cancelación.
    pub fn ignoring_cancellation(mut self) -> Self {
        self.accepts_cancellation = false;
        self
    }
}

#[async_trait]
impl<F, Fut> FunctionBody for FnBody<F>
    where F: Fn(InvocationContext, CancellationSignal) -> Fut + Send + Sync + 'static,
          Fut: Future<Output = Result<Value, FunctionError>> + Send + 'static
{
    async fn invoke(&self, ctx: InvocationContext, cancellation: CancellationSignal) -> Result<Value, FunctionError> {
        (self.f)(ctx, cancellation).await
    }

    fn accepts_cancellation(&self) -> bool {
        self.accepts_cancellation
    }
}

/// Piezas producidas al instanciar el destino de una invocación: el body y,
/// si el destino tiene la capacidad de filtro, su filtro de scope instance.
#[derive(Clone)]
pub struct InstanceParts {
    pub body: Arc<dyn FunctionBody>,
    pub filter: Option<Arc<dyn InvocationFilter>>,
}

pub(crate) type InstanceFactory = Arc<dyn Fn() -> InstanceParts + Send + Sync>;

/// Origen del body dentro del descriptor.
#[derive(Clone)]
pub(crate) enum BodySource {
    /// Body compartido por todas las invocaciones.
    Shared(Arc<dyn FunctionBody>),
    /// Destino construido de nuevo en cada invocación.
    PerInvocation { factory: InstanceFactory, filtered: bool },
}

impl BodySource {
    pub(crate) fn instantiate(&self) -> InstanceParts {
        match self {
            BodySource::Shared(body) => InstanceParts { body: body.clone(),
                                                        filter: None },
            BodySource::PerInvocation { factory, .. } => factory(),
        }
    }

    pub(crate) fn has_instance_filter(&self) -> bool {
        matches!(self, BodySource::PerInvocation { filtered: true, .. })
    }
}
