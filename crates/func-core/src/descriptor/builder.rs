//! Builder para `FunctionDescriptor`.
//!
//! Reemplaza el descubrimiento por reflexión de filtros declarativos: cada
//! filtro se registra explícitamente con su scope, y el orden de registro
//! dentro de un scope es el orden de ejecución.
//!
//! Notas de diseño
//! - Los filtros group siempre preceden a los unit, aunque las llamadas se
//!   intercalen (`unit_filter(..).group_filter(..)` produce group, unit).
//! - Las factories `*_filter_with` se invocan exactamente una vez, dentro de
//!   `build`; el filtro resultante es el singleton compartido por todas las
//!   invocaciones de la función.
//! - La capacidad de filtro instance se decide aquí, una sola vez, según se
//!   use `instance` o `filtered_instance`.
//!
//! ```ignore
//! let descriptor = FunctionDescriptor::builder("orders.process", "ProcessOrder")
//!     .group_filter(AuditFilter::default())
//!     .unit_filter_with(|| RetryBudgetFilter::new(3))
//!     .filtered_instance(OrderHandler::new)
//!     .timeout(TimeoutConfig::new(Duration::from_secs(30)))
//!     .build()?;
//! ```

use std::sync::Arc;

use serde_json::json;

use super::body::{BodySource, FunctionBody, InstanceParts};
use super::definition::{FunctionDescriptor, FunctionId, TimeoutConfig};
use crate::constants::PIPELINE_VERSION;
use crate::errors::FunctionError;
use crate::filter::{FilterEntry, FilterScope, InvocationFilter};
use crate::hashing::hash_value;

type FilterFactory = Box<dyn FnOnce() -> Arc<dyn InvocationFilter> + Send>;

/// Acumula la declaración de una función hasta `build`.
pub struct DescriptorBuilder {
    id: FunctionId,
    group: Vec<FilterFactory>,
    unit: Vec<FilterFactory>,
    body: Option<BodySource>,
    timeout: Option<TimeoutConfig>,
}

impl DescriptorBuilder {
    pub fn new(id: FunctionId) -> Self {
        Self { id,
               group: Vec::new(),
               unit: Vec::new(),
               body: None,
               timeout: None }
    }

    /// Registra un filtro group ya construido.
    pub fn group_filter<F: InvocationFilter + 'static>(mut self, filter: F) -> Self {
        self.group.push(Box::new(move || Arc::new(filter) as Arc<dyn InvocationFilter>));
        self
    }

    /// Registra un filtro group construido por `factory` durante `build`.
    pub fn group_filter_with<F, C>(mut self, factory: C) -> Self
        where F: InvocationFilter + 'static,
              C: FnOnce() -> F + Send + 'static
    {
        self.group.push(Box::new(move || Arc::new(factory()) as Arc<dyn InvocationFilter>));
        self
    }

    /// Registra un filtro group ya compartido (p.ej. el mismo para varias funciones).
    pub fn group_filter_arc(mut self, filter: Arc<dyn InvocationFilter>) -> Self {
        self.group.push(Box::new(move || filter));
        self
    }

    /// Registra un filtro unit ya construido.
    pub fn unit_filter<F: InvocationFilter + 'static>(mut self, filter: F) -> Self {
        self.unit.push(Box::new(move || Arc::new(filter) as Arc<dyn InvocationFilter>));
        self
    }

    /// Registra un filtro unit construido por `factory` durante `build`.
    pub fn unit_filter_with<F, C>(mut self, factory: C) -> Self
        where F: InvocationFilter + 'static,
              C: FnOnce() -> F + Send + 'static
    {
        self.unit.push(Box::new(move || Arc::new(factory()) as Arc<dyn InvocationFilter>));
        self
    }

    /// Body compartido por todas las invocaciones.
    pub fn body<B: FunctionBody + 'static>(mut self, body: B) -> Self {
        self.body = Some(BodySource::Shared(Arc::new(body)));
        self
    }

    /// Destino construido en cada invocación, sin capacidad de filtro.
    pub fn instance<T, C>(mut self, factory: C) -> Self
        where T: FunctionBody + 'static,
              C: Fn() -> T + Send + Sync + 'static
    {
        let factory = Arc::new(move || InstanceParts { body: Arc::new(factory()),
                                                       filter: None });
        self.body = Some(BodySource::PerInvocation { factory,
                                                     filtered: false });
        self
    }

    /// Destino construido en cada invocación que además actúa como filtro
    /// instance (primero en los pre-hooks, último en los post-hooks).
    pub fn filtered_instance<T, C>(mut self, factory: C) -> Self
        where T: FunctionBody + InvocationFilter + 'static,
              C: Fn() -> T + Send + Sync + 'static
    {
        let factory = Arc::new(move || {
            let target = Arc::new(factory());
            InstanceParts { body: target.clone(),
                            filter: Some(target) }
        });
        self.body = Some(BodySource::PerInvocation { factory,
                                                     filtered: true });
        self
    }

    pub fn timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Construye el descriptor. Falla si no se declaró body ni instance.
    pub fn build(self) -> Result<FunctionDescriptor, FunctionError> {
        let body = self.body
                       .ok_or_else(|| FunctionError::InvalidDescriptor(format!("function '{}' has no body", self.id.name)))?;

        let filters: Vec<FilterEntry> = self.group
                                            .into_iter()
                                            .map(|f| FilterEntry::new(FilterScope::Group, f()))
                                            .chain(self.unit.into_iter().map(|f| FilterEntry::new(FilterScope::Unit, f())))
                                            .collect();

        let definition_hash = definition_hash(&self.id, &filters, body.has_instance_filter(), self.timeout.as_ref());
        log::debug!("descriptor built: {} ({} shared filters) hash={}",
                    self.id.name,
                    filters.len(),
                    definition_hash);

        Ok(FunctionDescriptor { id: self.id,
                                filters,
                                body,
                                timeout: self.timeout,
                                definition_hash })
    }
}

fn definition_hash(id: &FunctionId, filters: &[FilterEntry], instance_filter: bool, timeout: Option<&TimeoutConfig>) -> String {
    let filter_json: Vec<_> = filters.iter().map(|e| json!([e.scope.to_string(), e.name()])).collect();
    let timeout_json = timeout.map(|t| {
                                  json!({
                                      "ms": t.duration_ms(),
                                      "throw": t.throw_on_timeout,
                                      "enforce_debug": t.enforce_while_debugging,
                                  })
                              });
    hash_value(&json!({
        "pipeline_version": PIPELINE_VERSION,
        "id": id.id,
        "name": id.name,
        "instance_filter": instance_filter,
        "filters": filter_json,
        "timeout": timeout_json,
    }))
}
