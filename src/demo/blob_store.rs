use dashmap::DashMap;
use serde_json::Value;

/// Contenedor de blobs en memoria (clave = ruta).
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: DashMap<String, Value>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, path: impl Into<String>, content: Value) {
        self.blobs.insert(path.into(), content);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.blobs.get(path).map(|v| v.value().clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Rutas ordenadas.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }
}
