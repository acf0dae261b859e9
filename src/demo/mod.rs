//! Funciones de demostración que simulan triggers de cola y de blob.
//!
//! - `ProcessOrder`: mensaje de cola con un pedido; valida, calcula el total
//!   y guarda un recibo en el `BlobStore`.
//! - `ResizeImage`: blob nuevo; destino por invocación con filtro instance y
//!   timeout de 1s que respeta la cancelación.

pub mod blob_store;
pub mod filters;
pub mod functions;

use std::sync::Arc;

use func_host::{FunctionHost, HostError};

pub use blob_store::BlobStore;
pub use filters::{AuditFilter, ValidateOrderFilter};
pub use functions::{process_order_definition, resize_image_definition, Order};

/// Registra todas las funciones demo sobre `host`.
pub fn register_demo_functions(host: &FunctionHost, store: Arc<BlobStore>, audit: Arc<AuditFilter>) -> Result<(), HostError> {
    host.register(process_order_definition(store.clone(), audit.clone()))?;
    host.register(resize_image_definition(store, audit))?;
    Ok(())
}
