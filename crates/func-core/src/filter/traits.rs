use async_trait::async_trait;

use crate::errors::FunctionError;
use crate::model::{ExecutedContext, ExecutingContext};

/// Par de hooks before/after que intercepta una invocación.
///
/// Los filtros de scope group/unit se construyen una sola vez por descriptor y
/// se comparten entre TODAS las invocaciones concurrentes de esa función. El
/// pipeline no añade ningún lock alrededor de los hooks: si un filtro guarda
/// estado mutable, la sincronización es responsabilidad del propio filtro.
///
/// Un panic dentro de un hook se captura y se registra como
/// `FunctionError::Filter` de esa fase: en el pre-phase corta la fase igual que
/// un error, y en el post-phase no impide los post-hooks restantes.
#[async_trait]
pub trait InvocationFilter: Send + Sync {
    /// Nombre estable usado en errores, trazas y en el `definition_hash`.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Hook previo al body. Un error aquí detiene el resto de pre-hooks y el body.
    async fn on_executing(&self, _ctx: &ExecutingContext) -> Result<(), FunctionError> {
        Ok(())
    }

    /// Hook posterior. Se ejecuta siempre que el `on_executing` de este mismo
    /// filtro haya terminado bien, aunque el body o filtros internos fallen.
    async fn on_executed(&self, _ctx: &ExecutedContext) -> Result<(), FunctionError> {
        Ok(())
    }
}
