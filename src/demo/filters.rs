use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use func_core::{ExecutedContext, ExecutingContext, FilterPhase, FunctionError, InvocationFilter};
use serde_json::json;

use super::functions::Order;

const STARTED_AT: &str = "audit.started_at";

/// Filtro group compartido por todas las funciones demo: marca el inicio en
/// el property bag y registra el resultado del body al terminar.
#[derive(Debug, Default)]
pub struct AuditFilter {
    started: AtomicU64,
    completed: AtomicU64,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvocationFilter for AuditFilter {
    fn name(&self) -> &str {
        "audit"
    }

    async fn on_executing(&self, ctx: &ExecutingContext) -> Result<(), FunctionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        ctx.properties().insert(STARTED_AT, json!(Utc::now().to_rfc3339()));
        Ok(())
    }

    async fn on_executed(&self, ctx: &ExecutedContext) -> Result<(), FunctionError> {
        self.completed.fetch_add(1, Ordering::SeqCst);
        let started = ctx.properties()
                         .get(STARTED_AT)
                         .and_then(|v| v.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()));
        let elapsed_ms = started.map(|s| (Utc::now() - s.with_timezone(&Utc)).num_milliseconds());
        let result = ctx.result();
        match &result.exception {
            None => ctx.logger().info(&format!("audit: ok in {elapsed_ms:?}ms")),
            Some(e) => ctx.logger().warn(&format!("audit: body failed after {elapsed_ms:?}ms: {e}")),
        }
        Ok(())
    }
}

/// Filtro unit de `ProcessOrder`: rechaza pedidos mal formados antes del body.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidateOrderFilter;

#[async_trait]
impl InvocationFilter for ValidateOrderFilter {
    fn name(&self) -> &str {
        "validate-order"
    }

    async fn on_executing(&self, ctx: &ExecutingContext) -> Result<(), FunctionError> {
        let order: Order = ctx.arguments()
                              .get_as("order")
                              .ok_or_else(|| FunctionError::filter(self.name(), FilterPhase::Before, "missing or malformed 'order'"))?;
        if order.quantity == 0 {
            return Err(FunctionError::filter(self.name(), FilterPhase::Before, format!("order {} has zero quantity", order.id)));
        }
        ctx.properties().insert("order.validated", json!(order.id));
        Ok(())
    }
}
