//! Contextos compartidos por filtros y body durante una invocación.
//!
//! - `InvocationContext`: identidad, argumentos inmutables, property bag y logger.
//! - `ExecutingContext`: lo que reciben los hooks previos.
//! - `ExecutedContext`: lo que reciben los hooks posteriores; añade el
//!   `FunctionResult` del body.
//!
//! Todos los campos compartidos son handles (`Arc` por debajo): clonar un
//! contexto no duplica ni el snapshot ni el bag.

use std::ops::Deref;

use uuid::Uuid;

use super::{ArgumentSnapshot, FunctionResult, InvocationLogger, PropertyBag};

#[derive(Debug, Clone)]
pub struct InvocationContext {
    invocation_id: Uuid,
    function_id: String,
    function_name: String,
    arguments: ArgumentSnapshot,
    properties: PropertyBag,
    logger: InvocationLogger,
}

impl InvocationContext {
    /// Crea el contexto de una invocación con un property bag vacío y nuevo.
    pub fn new(invocation_id: Uuid, function_id: impl Into<String>, function_name: impl Into<String>, arguments: ArgumentSnapshot) -> Self {
        let function_name = function_name.into();
        Self { invocation_id,
               function_id: function_id.into(),
               logger: InvocationLogger::new(invocation_id, function_name.clone()),
               function_name,
               arguments,
               properties: PropertyBag::new() }
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn function_id(&self) -> &str {
        &self.function_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn arguments(&self) -> &ArgumentSnapshot {
        &self.arguments
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn logger(&self) -> &InvocationLogger {
        &self.logger
    }
}

/// Contexto entregado a `InvocationFilter::on_executing`.
#[derive(Debug, Clone)]
pub struct ExecutingContext {
    inner: InvocationContext,
}

impl ExecutingContext {
    pub fn new(inner: InvocationContext) -> Self {
        Self { inner }
    }

    pub fn invocation(&self) -> &InvocationContext {
        &self.inner
    }
}

impl Deref for ExecutingContext {
    type Target = InvocationContext;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Contexto entregado a `InvocationFilter::on_executed`.
#[derive(Debug, Clone)]
pub struct ExecutedContext {
    inner: InvocationContext,
    result: FunctionResult,
}

impl ExecutedContext {
    pub fn new(inner: InvocationContext, result: FunctionResult) -> Self {
        Self { inner, result }
    }

    pub fn invocation(&self) -> &InvocationContext {
        &self.inner
    }

    /// Resultado del body (independiente de fallos de filtros).
    pub fn result(&self) -> &FunctionResult {
        &self.result
    }
}

impl Deref for ExecutedContext {
    type Target = InvocationContext;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
