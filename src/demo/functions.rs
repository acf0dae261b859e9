use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use func_core::{CancellationSignal, ExecutedContext, ExecutingContext, FunctionBody, FunctionDescriptor, FunctionError, InvocationContext,
                InvocationFilter, TimeoutConfig};
use func_host::FunctionDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::blob_store::BlobStore;
use super::filters::{AuditFilter, ValidateOrderFilter};

/// Mensaje de cola procesado por `ProcessOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

impl Order {
    pub fn total_cents(&self) -> u64 {
        u64::from(self.quantity) * self.unit_price_cents
    }
}

/// `ProcessOrder`: trigger de cola. Filtros audit (group) y validate-order
/// (unit); el body guarda el recibo en `receipts/<id>`.
pub fn process_order_definition(store: Arc<BlobStore>, audit: Arc<AuditFilter>) -> FunctionDefinition {
    FunctionDefinition::new("ProcessOrder", move || {
        let store = store.clone();
        FunctionDescriptor::builder("demo.process_order", "ProcessOrder").group_filter_arc(audit.clone())
                                                                         .unit_filter(ValidateOrderFilter)
                                                                         .body(ReceiptWriter { store })
                                                                         .build()
    })
}

struct ReceiptWriter {
    store: Arc<BlobStore>,
}

#[async_trait]
impl FunctionBody for ReceiptWriter {
    async fn invoke(&self, ctx: InvocationContext, _cancellation: CancellationSignal) -> Result<Value, FunctionError> {
        let order: Order = ctx.arguments()
                              .get_as("order")
                              .ok_or_else(|| FunctionError::body("order argument is not an Order"))?;
        let receipt = json!({
            "order": order.id,
            "total_cents": order.total_cents(),
            "invocation": ctx.invocation_id().to_string(),
        });
        self.store.put(format!("receipts/{}", order.id), receipt.clone());
        ctx.logger().info(&format!("receipt stored for order {}", order.id));
        Ok(receipt)
    }
}

/// `ResizeImage`: trigger de blob. Se instancia un `ImageResizer` por
/// invocación, que además es el filtro instance de la función.
pub fn resize_image_definition(store: Arc<BlobStore>, audit: Arc<AuditFilter>) -> FunctionDefinition {
    FunctionDefinition::new("ResizeImage", move || {
        let store = store.clone();
        FunctionDescriptor::builder("demo.resize_image", "ResizeImage").group_filter_arc(audit.clone())
                                                                       .filtered_instance(move || ImageResizer { store: store.clone() })
                                                                       .timeout(TimeoutConfig::new(Duration::from_secs(1)))
                                                                       .build()
    })
}

struct ImageResizer {
    store: Arc<BlobStore>,
}

#[async_trait]
impl InvocationFilter for ImageResizer {
    fn name(&self) -> &str {
        "image-resizer"
    }

    async fn on_executing(&self, ctx: &ExecutingContext) -> Result<(), FunctionError> {
        let path: String = ctx.arguments()
                              .get_as("path")
                              .ok_or_else(|| FunctionError::filter(self.name(), func_core::FilterPhase::Before, "missing 'path'"))?;
        match self.store.get(&path) {
            Some(blob) => {
                ctx.properties().insert("source.blob", blob);
                Ok(())
            }
            None => Err(FunctionError::filter(self.name(), func_core::FilterPhase::Before, format!("blob '{path}' not found"))),
        }
    }

    async fn on_executed(&self, ctx: &ExecutedContext) -> Result<(), FunctionError> {
        ctx.properties().remove("source.blob");
        Ok(())
    }
}

#[async_trait]
impl FunctionBody for ImageResizer {
    async fn invoke(&self, ctx: InvocationContext, cancellation: CancellationSignal) -> Result<Value, FunctionError> {
        let path: String = ctx.arguments().get_as("path").unwrap_or_default();
        let width: u64 = ctx.arguments().get_as("width").unwrap_or(128);
        // tiempo simulado de procesamiento
        let work_ms: u64 = ctx.arguments().get_as("work_ms").unwrap_or(10);
        let source = ctx.properties().get("source.blob").unwrap_or(Value::Null);

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(work_ms)) => {}
            _ = cancellation.cancelled() => {
                ctx.logger().warn("resize cancelled");
                return Err(FunctionError::Cancelled { function_name: ctx.function_name().to_string() });
            }
        }

        let target = format!("thumbnails/{width}/{path}");
        let thumbnail = json!({ "from": path, "width": width, "source": source });
        self.store.put(target.clone(), thumbnail);
        Ok(json!({ "thumbnail": target }))
    }
}
