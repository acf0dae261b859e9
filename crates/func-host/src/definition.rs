//! Definición registrable de una función.
//!
//! La factory del descriptor se ejecuta en la primera invocación y una sola
//! vez: a partir de ahí todas las invocaciones comparten el mismo descriptor
//! (y por tanto los mismos filtros group y unit).

use std::sync::Arc;

use func_core::{FunctionDescriptor, FunctionError};
use once_cell::sync::OnceCell;

type DescriptorFactory = Box<dyn Fn() -> Result<FunctionDescriptor, FunctionError> + Send + Sync>;

pub struct FunctionDefinition {
    name: String,
    factory: DescriptorFactory,
    descriptor: OnceCell<Arc<FunctionDescriptor>>,
}

impl FunctionDefinition {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
        where F: Fn() -> Result<FunctionDescriptor, FunctionError> + Send + Sync + 'static
    {
        Self { name: name.into(),
               factory: Box::new(factory),
               descriptor: OnceCell::new() }
    }

    /// Definición con un descriptor ya construido.
    pub fn prebuilt(descriptor: FunctionDescriptor) -> Self {
        let name = descriptor.name().to_string();
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(descriptor));
        Self { name,
               factory: Box::new(|| Err(FunctionError::Internal("descriptor already built".into()))),
               descriptor: cell }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` si el descriptor ya fue construido.
    pub fn is_indexed(&self) -> bool {
        self.descriptor.get().is_some()
    }

    /// Devuelve el descriptor, construyéndolo en la primera llamada. Si la
    /// factory falla, la siguiente llamada lo reintenta.
    pub fn descriptor(&self) -> Result<Arc<FunctionDescriptor>, FunctionError> {
        self.descriptor
            .get_or_try_init(|| {
                log::debug!("indexing function '{}'", self.name);
                (self.factory)().map(Arc::new)
            })
            .cloned()
    }
}

impl std::fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDefinition")
         .field("name", &self.name)
         .field("indexed", &self.is_indexed())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use func_core::FnBody;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn factory_runs_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let def = FunctionDefinition::new("Echo", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            FunctionDescriptor::builder("echo", "Echo").body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
                                                       .build()
        });
        assert!(!def.is_indexed());
        let a = def.descriptor().unwrap();
        let b = def.descriptor().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_factory_is_retried() {
        let def = FunctionDefinition::new("Broken", || FunctionDescriptor::builder("broken", "Broken").build());
        assert!(matches!(def.descriptor(), Err(FunctionError::InvalidDescriptor(_))));
        assert!(!def.is_indexed());
    }
}
