//! func-core: pipeline de invocación de funciones.
//!
//! Envuelve cada ejecución de una función en una cadena "onion" de filtros
//! (instance, group, unit) con garantías estrictas de orden y de fallo
//! parcial, y aplica un timeout opcional con cancelación cooperativa.
//!
//! El descubrimiento de funciones, el binding de parámetros y los listeners
//! de triggers son colaboradores externos: entregan un `FunctionDescriptor`
//! ya resuelto y un `ArgumentSnapshot`, y consumen el `FunctionResult` y los
//! eventos de traza.
pub mod constants;
pub mod descriptor;
pub mod errors;
pub mod event;
pub mod filter;
pub mod hashing;
pub mod model;
pub mod pipeline;

pub use descriptor::{DescriptorBuilder, FnBody, FunctionBody, FunctionDescriptor, FunctionId, TimeoutConfig};
pub use errors::{FilterPhase, FunctionError, InvocationError};
pub use event::{ErrorSource, ExecutionReason, InMemoryTraceSink, InvocationEvent, InvocationEventKind, InvocationStatus, NullTraceSink,
                TraceSink};
pub use filter::{FilterChain, FilterChainBuilder, FilterEntry, FilterScope, FnFilter, InvocationFilter};
pub use model::{ArgumentSnapshot, CancellationSignal, ExecutedContext, ExecutingContext, FunctionResult, InvocationContext, InvocationLogger,
                PropertyBag};
pub use pipeline::{ExceptionAggregator, ExceptionHandler, GuardOutcome, InvocationPipeline, InvocationRequest, LoggingExceptionHandler,
                   OrphanedInvocation, RecordedError, TimeoutGuard};

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::{json, Value};
	use std::sync::{Arc, Mutex};

	type Trace = Arc<Mutex<Vec<String>>>;

	fn tracing_filter(name: &'static str, trace: &Trace) -> FnFilter {
		let pre = trace.clone();
		let post = trace.clone();
		FnFilter::new(name).before(move |_| {
			                   pre.lock().unwrap().push(format!("Pre-{name}"));
			                   Ok(())
		                   })
		                   .after(move |_| {
			                   post.lock().unwrap().push(format!("Post-{name}"));
			                   Ok(())
		                   })
	}

	#[tokio::test]
	async fn descriptor_runs_filters_around_body() {
		let trace: Trace = Arc::default();
		let body_trace = trace.clone();
		let descriptor = FunctionDescriptor::builder("demo", "Demo").group_filter(tracing_filter("G", &trace))
		                                                            .unit_filter(tracing_filter("U", &trace))
		                                                            .body(FnBody::new(move |ctx, _c| {
			                                                            let t = body_trace.clone();
			                                                            async move {
				                                                            t.lock().unwrap().push("body".into());
				                                                            Ok(json!({ "echo": ctx.arguments().get("x").cloned() }))
			                                                            }
		                                                            }))
		                                                            .build()
		                                                            .expect("descriptor");

		let args: ArgumentSnapshot = vec![("x", json!(7))].into_iter().collect();
		let result = InvocationPipeline::new().invoke(&descriptor, InvocationRequest::new(args))
		                                      .await
		                                      .expect("invocation should succeed");

		assert!(result.succeeded);
		assert_eq!(result.output, Some(json!({"echo": 7})));
		assert_eq!(*trace.lock().unwrap(), vec!["Pre-G", "Pre-U", "body", "Post-U", "Post-G"]);
	}

	#[test]
	fn definition_hash_is_stable_for_same_declaration() {
		let build = || {
			FunctionDescriptor::builder("demo", "Demo").unit_filter(FnFilter::new("U"))
			                                           .body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
			                                           .build()
			                                           .expect("descriptor")
		};
		let a = build();
		let b = build();
		assert_eq!(a.definition_hash(), b.definition_hash());
		assert_eq!(a.definition_hash().len(), 64);

		let c = FunctionDescriptor::builder("demo", "Demo").unit_filter(FnFilter::new("Other"))
		                                                   .body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
		                                                   .build()
		                                                   .expect("descriptor");
		assert_ne!(a.definition_hash(), c.definition_hash());
	}

	#[test]
	fn descriptor_without_body_is_rejected() {
		let err = FunctionDescriptor::builder("demo", "Demo").build().unwrap_err();
		assert!(matches!(err, FunctionError::InvalidDescriptor(_)));
	}
}
