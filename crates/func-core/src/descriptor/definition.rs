use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::body::{BodySource, InstanceParts};
use super::DescriptorBuilder;
use crate::filter::FilterEntry;

/// Identidad de una función: id opaco + nombre para mostrar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId {
    pub id: String,
    pub name: String,
}

impl FunctionId {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(),
               name: name.into() }
    }
}

/// Configuración del guard de timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub duration: Duration,
    /// `true`: al vencer se propaga un error de timeout dedicado.
    /// `false`: se propaga un error con sabor a cancelación.
    pub throw_on_timeout: bool,
    /// Si es `false`, el timeout no se aplica mientras hay un debugger adjunto.
    pub enforce_while_debugging: bool,
}

impl TimeoutConfig {
    pub fn new(duration: Duration) -> Self {
        Self { duration,
               throw_on_timeout: true,
               enforce_while_debugging: false }
    }

    pub fn throw_on_timeout(mut self, value: bool) -> Self {
        self.throw_on_timeout = value;
        self
    }

    pub fn enforce_while_debugging(mut self, value: bool) -> Self {
        self.enforce_while_debugging = value;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Definición resuelta e inmutable de una función.
///
/// `filters` contiene sólo los filtros compartidos (group y luego unit, en
/// orden de declaración). El filtro instance, si existe, lo añade
/// `FilterChainBuilder` en cada invocación.
pub struct FunctionDescriptor {
    pub(crate) id: FunctionId,
    pub(crate) filters: Vec<FilterEntry>,
    pub(crate) body: BodySource,
    pub(crate) timeout: Option<TimeoutConfig>,
    pub(crate) definition_hash: String,
}

impl FunctionDescriptor {
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(FunctionId::new(id, name))
    }

    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Filtros compartidos (group, unit) en orden de ejecución.
    pub fn shared_filters(&self) -> &[FilterEntry] {
        &self.filters
    }

    pub fn timeout(&self) -> Option<&TimeoutConfig> {
        self.timeout.as_ref()
    }

    /// `true` si el destino por invocación aporta un filtro instance.
    pub fn has_instance_filter(&self) -> bool {
        self.body.has_instance_filter()
    }

    /// Hash determinista de la declaración (id, nombre, filtros, timeout).
    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    /// Construye las piezas de una invocación nueva (destino fresco si el body
    /// es por invocación).
    pub fn instantiate(&self) -> InstanceParts {
        self.body.instantiate()
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
         .field("id", &self.id)
         .field("filters", &self.filters)
         .field("instance_filter", &self.has_instance_filter())
         .field("timeout", &self.timeout)
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}
