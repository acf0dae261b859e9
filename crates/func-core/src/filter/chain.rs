//! `FilterChainBuilder`: secuencia fija de filtros de una invocación.
//!
//! Orden: `[instance?] + group (orden declarado) + unit (orden declarado)`.
//! La parte compartida ya viene ordenada en el descriptor; aquí sólo se
//! antepone el filtro instance de la invocación, si lo hay.

use std::sync::Arc;

use super::{FilterEntry, FilterScope, InvocationFilter};
use crate::descriptor::FunctionDescriptor;

/// Lista ordenada e inmutable de filtros para UNA invocación.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    entries: Vec<FilterEntry>,
}

impl FilterChain {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FilterEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Nombres en orden de pre-hooks (útil para logs y tests).
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name().to_string()).collect()
    }
}

pub struct FilterChainBuilder;

impl FilterChainBuilder {
    /// Construye la cadena de una invocación. Pura: no construye filtros
    /// group/unit (ya viven en el descriptor).
    pub fn build(descriptor: &FunctionDescriptor, instance_filter: Option<Arc<dyn InvocationFilter>>) -> FilterChain {
        let shared = descriptor.shared_filters();
        let mut entries = Vec::with_capacity(shared.len() + 1);
        if let Some(filter) = instance_filter {
            entries.push(FilterEntry::new(FilterScope::Instance, filter));
        }
        entries.extend(shared.iter().cloned());
        debug_assert!(entries.windows(2).all(|w| w[0].scope <= w[1].scope),
                      "filter chain must be ordered instance < group < unit");
        FilterChain { entries }
    }
}
