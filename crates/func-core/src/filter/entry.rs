use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::InvocationFilter;

/// Nivel de colocación de un filtro. El orden de las variantes es el orden de
/// ejecución de los pre-hooks: instance < group < unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterScope {
    /// Construido por invocación junto al objeto destino que posee el body.
    Instance,
    /// Declarado para un grupo de funciones; singleton por descriptor.
    Group,
    /// Declarado para una función concreta; singleton por descriptor.
    Unit,
}

impl fmt::Display for FilterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterScope::Instance => f.write_str("instance"),
            FilterScope::Group => f.write_str("group"),
            FilterScope::Unit => f.write_str("unit"),
        }
    }
}

/// Entrada de la cadena: scope + referencia a la capacidad.
#[derive(Clone)]
pub struct FilterEntry {
    pub scope: FilterScope,
    pub filter: Arc<dyn InvocationFilter>,
}

impl FilterEntry {
    pub fn new(scope: FilterScope, filter: Arc<dyn InvocationFilter>) -> Self {
        Self { scope, filter }
    }

    pub fn name(&self) -> &str {
        self.filter.name()
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
         .field("scope", &self.scope)
         .field("filter", &self.filter.name())
         .finish()
    }
}
