use std::sync::Arc;

use func_core::{ArgumentSnapshot, CancellationSignal, ExecutionReason, InMemoryTraceSink, InvocationEventKind, TraceSink};
use func_host::{FunctionHost, HostConfig, TrackingExceptionHandler};
use funcflow_rust::demo::{register_demo_functions, AuditFilter, BlobStore};
use funcflow_rust::errors::AppError;
use serde_json::json;
use uuid::Uuid;

fn main() -> Result<(), AppError> {
    // Cargar configuración (incluye .env si existe)
    let config = HostConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
    println!("Configuración: timeout por defecto={:?} gracia={:?} debugging={}",
             config.default_timeout.map(|t| t.duration),
             config.grace_period,
             config.debugging);

    let sink = Arc::new(InMemoryTraceSink::new());
    let orphans = Arc::new(TrackingExceptionHandler::new());
    let host = FunctionHost::new(config).with_sink(sink.clone())
                                        .with_exception_handler(orphans.clone());
    let store = Arc::new(BlobStore::new());
    let audit = Arc::new(AuditFilter::new());
    register_demo_functions(&host, store.clone(), audit.clone())?;
    println!("Funciones registradas: {:?}", host.function_names());

    // Cola simulada: un pedido válido y uno con cantidad cero
    let runtime = tokio::runtime::Runtime::new()?;
    let queue = vec![json!({ "id": "o-100", "quantity": 3, "unit_price_cents": 1250 }),
                     json!({ "id": "o-101", "quantity": 0, "unit_price_cents": 999 }),];
    for message in queue {
        let args: ArgumentSnapshot = vec![("order", message)].into_iter().collect();
        let outcome = runtime.block_on(host.trigger("ProcessOrder", args, ExecutionReason::AutomaticTrigger, CancellationSignal::new()));
        match outcome {
            Ok(result) => {
                println!("[queue] ProcessOrder ok: {}", result.output.unwrap_or_default());
                print_trace(sink.as_ref(), result.invocation_id);
            }
            Err(e) => println!("[queue] ProcessOrder falló: {e}"),
        }
    }

    // Blob nuevo: dispara ResizeImage
    store.put("uploads/cat.png", json!({ "bytes": 2048 }));
    let args: ArgumentSnapshot = vec![("path", json!("uploads/cat.png")), ("width", json!(64))].into_iter().collect();
    let result = host.call_blocking("ResizeImage", args)?;
    println!("[blob] ResizeImage: {} (duración {:?})", result.output.unwrap_or_default(), result.duration);
    print_trace(sink.as_ref(), result.invocation_id);

    // Blob inexistente: el filtro instance corta antes del body
    let args: ArgumentSnapshot = vec![("path", json!("uploads/missing.png"))].into_iter().collect();
    if let Err(e) = host.call_blocking("ResizeImage", args) {
        println!("[blob] ResizeImage falló: {e} -> {:?}", e.function_error());
    }

    if cfg!(feature = "timeout_demo") {
        // Excede el timeout de 1s: el body observa la cancelación
        let args: ArgumentSnapshot = vec![("path", json!("uploads/cat.png")), ("work_ms", json!(5000))].into_iter().collect();
        match host.call_blocking("ResizeImage", args) {
            Ok(r) => println!("[timeout] inesperado: {:?}", r.output),
            Err(e) => println!("[timeout] {e} -> {:?}", e.function_error()),
        }
        println!("[timeout] huérfanos retenidos: {}", orphans.orphan_count());
    }

    println!("Blobs: {:?}", store.paths());
    println!("Audit: iniciadas={} completadas={}", audit.started(), audit.completed());
    Ok(())
}

fn print_trace(sink: &dyn TraceSink, invocation_id: Uuid) {
    for ev in sink.list(invocation_id) {
        let label = match &ev.kind {
            InvocationEventKind::Executing { reason, .. } => format!("Executing ({reason})"),
            InvocationEventKind::ErrorRecorded { source, error } => format!("ErrorRecorded {source:?}: {error}"),
            InvocationEventKind::TimeoutElapsed { timeout_ms, .. } => format!("TimeoutElapsed {timeout_ms}ms"),
            InvocationEventKind::Executed { status, duration_ms, .. } => format!("Executed {status:?} in {duration_ms}ms"),
        };
        println!("    #{} {} {}", ev.seq, ev.ts.format("%H:%M:%S%.3f"), label);
    }
}
