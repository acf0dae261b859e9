//! Property bag por invocación.
//!
//! Almacén clave/valor mutable compartido por referencia entre todos los
//! filtros y el body de UNA invocación. Se crea vacío en cada invocación y
//! nunca se comparte entre invocaciones distintas.

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    inner: Arc<DashMap<String, Value>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o reemplaza; devuelve el valor previo si existía.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.insert(key.into(), value)
    }

    /// Copia del valor (no se expone el guard interno de `DashMap`).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|v| v.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Identidad: `true` si ambos handles son el mismo bag.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copia ordenada por clave (útil para logs y asserts).
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        let mut out: IndexMap<String, Value> =
            self.inner.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
        out.sort_keys();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_identity_new_bags_do_not() {
        let bag = PropertyBag::new();
        let alias = bag.clone();
        alias.insert("k", json!(1));
        assert!(bag.ptr_eq(&alias));
        assert_eq!(bag.get("k"), Some(json!(1)));
        assert!(!bag.ptr_eq(&PropertyBag::new()));
    }
}
