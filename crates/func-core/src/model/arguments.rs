//! Snapshot inmutable de argumentos ya resueltos por el subsistema de binding.
//!
//! Los valores son opacos para el pipeline (JSON neutro). El orden de inserción
//! se conserva para que los logs y las trazas sean deterministas.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Mapa nombre → valor, fijo durante toda la invocación.
///
/// Clonar un snapshot sólo clona el `Arc`; no existe API de mutación.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSnapshot {
    inner: Arc<IndexMap<String, Value>>,
}

impl ArgumentSnapshot {
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Self { inner: Arc::new(values) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Decodifica un argumento a un tipo concreto. `None` si no existe o no
    /// encaja con `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.inner.get(name).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Representación JSON (objeto) del snapshot, en orden de inserción.
    pub fn to_value(&self) -> Value {
        Value::Object(self.inner.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Dos handles apuntan al mismo snapshot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ArgumentSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_insertion_order_and_decodes() {
        let args: ArgumentSnapshot = vec![("queue", json!("orders")), ("count", json!(3))].into_iter().collect();
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["queue", "count"]);
        assert_eq!(args.get_as::<u32>("count"), Some(3));
        assert_eq!(args.get_as::<u32>("queue"), None);
        assert!(args.get("missing").is_none());
    }
}
