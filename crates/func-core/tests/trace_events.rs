
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use func_core::{ArgumentSnapshot, CancellationSignal, ErrorSource, ExecutionReason, FilterPhase, FilterScope, FnBody, FunctionBody,
                FunctionDescriptor, FunctionError, InMemoryTraceSink, InvocationContext, InvocationEventKind, InvocationPipeline,
                InvocationRequest, InvocationStatus, TimeoutConfig, TraceSink};
use serde_json::{json, Value};
use test_support::{RecordingFilter, Trace};

fn pipeline_with_sink() -> (InvocationPipeline, Arc<InMemoryTraceSink>) {
    let sink = Arc::new(InMemoryTraceSink::new());
    (InvocationPipeline::new().with_sink(sink.clone()), sink)
}

#[tokio::test]
async fn successful_invocation_emits_executing_then_executed() {
    let (pipeline, sink) = pipeline_with_sink();
    let descriptor = FunctionDescriptor::builder("ok", "Ok").body(FnBody::new(|_ctx, _c| async { Ok(json!(1)) }))
                                                            .build()
                                                            .expect("descriptor");
    let result = pipeline.invoke(&descriptor,
                                 InvocationRequest::new(ArgumentSnapshot::empty()).with_reason(ExecutionReason::AutomaticTrigger))
                         .await
                         .expect("invocation");

    let events = sink.list(result.invocation_id);
    assert_eq!(events.len(), 2);
    assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![0, 1]);
    match &events[0].kind {
        InvocationEventKind::Executing { function_name, reason } => {
            assert_eq!(function_name, "Ok");
            assert_eq!(*reason, ExecutionReason::AutomaticTrigger);
        }
        other => panic!("unexpected first event {other:?}"),
    }
    assert!(matches!(events[1].kind,
                     InvocationEventKind::Executed { status: InvocationStatus::Succeeded,
                                                     .. }));
}

#[tokio::test]
async fn every_error_is_recorded_even_when_superseded() {
    let (pipeline, sink) = pipeline_with_sink();
    let trace = Trace::default();
    let descriptor = FunctionDescriptor::builder("errs", "Errors").group_filter(RecordingFilter::new("G", &trace).failing_after())
                                                                  .unit_filter(RecordingFilter::new("U", &trace).failing_after())
                                                                  .body(FnBody::new(|_ctx, _c| async { Err(FunctionError::body("body failure")) }))
                                                                  .build()
                                                                  .expect("descriptor");
    let err = pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                      .await
                      .unwrap_err();
    assert_eq!(err.inner(), &FunctionError::filter("G", FilterPhase::After, "post failure"));

    let recorded: Vec<ErrorSource> = sink.list(err.invocation_id)
                                         .into_iter()
                                         .filter_map(|e| match e.kind {
                                             InvocationEventKind::ErrorRecorded { source, .. } => Some(source),
                                             _ => None,
                                         })
                                         .collect();
    assert_eq!(recorded,
               vec![ErrorSource::Body,
                    ErrorSource::Filter { index: 1,
                                          scope: FilterScope::Unit,
                                          name: "U".into(),
                                          phase: FilterPhase::After },
                    ErrorSource::Filter { index: 0,
                                          scope: FilterScope::Group,
                                          name: "G".into(),
                                          phase: FilterPhase::After },]);

    let last = sink.list(err.invocation_id).pop().expect("events");
    assert!(matches!(last.kind,
                     InvocationEventKind::Executed { status: InvocationStatus::Failed,
                                                     .. }));
}

#[tokio::test]
async fn pre_phase_failure_records_the_failing_filter() {
    let (pipeline, sink) = pipeline_with_sink();
    let trace = Trace::default();
    let descriptor = FunctionDescriptor::builder("pre", "Pre").group_filter(RecordingFilter::new("G", &trace))
                                                              .unit_filter(RecordingFilter::new("U", &trace).failing_before())
                                                              .body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
                                                              .build()
                                                              .expect("descriptor");
    let err = pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                      .await
                      .unwrap_err();
    let events = sink.list(err.invocation_id);
    let kinds: Vec<&str> = events.iter()
                                 .map(|e| match e.kind {
                                     InvocationEventKind::Executing { .. } => "executing",
                                     InvocationEventKind::ErrorRecorded { .. } => "error",
                                     InvocationEventKind::TimeoutElapsed { .. } => "timeout",
                                     InvocationEventKind::Executed { .. } => "executed",
                                 })
                                 .collect();
    assert_eq!(kinds, vec!["executing", "error", "executed"]);
}

struct Sleeper;

#[async_trait]
impl FunctionBody for Sleeper {
    async fn invoke(&self, _ctx: InvocationContext, cancellation: CancellationSignal) -> Result<Value, FunctionError> {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(Value::Null),
            _ = cancellation.cancelled() => Err(FunctionError::Cancelled { function_name: "Sleeper".into() }),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn timeout_emits_timeout_elapsed_before_the_body_error() {
    let (pipeline, sink) = pipeline_with_sink();
    let descriptor = FunctionDescriptor::builder("sleep", "Sleeper").body(Sleeper)
                                                                    .timeout(TimeoutConfig::new(Duration::from_millis(250)).throw_on_timeout(false))
                                                                    .build()
                                                                    .expect("descriptor");
    let err = pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                      .await
                      .unwrap_err();
    let events = sink.list(err.invocation_id);
    assert_eq!(events.len(), 4);
    assert!(matches!(events[1].kind,
                     InvocationEventKind::TimeoutElapsed { timeout_ms: 250,
                                                           throw_on_timeout: false }));
    assert!(matches!(&events[2].kind,
                     InvocationEventKind::ErrorRecorded { source: ErrorSource::Body,
                                                          error: FunctionError::Cancelled { .. } }));
}

#[tokio::test]
async fn concurrent_invocations_keep_separate_event_streams() {
    let (pipeline, sink) = pipeline_with_sink();
    let pipeline = Arc::new(pipeline);
    let descriptor = Arc::new(FunctionDescriptor::builder("par", "Parallel").body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
                                                                            .build()
                                                                            .expect("descriptor"));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let (p, d) = (pipeline.clone(), descriptor.clone());
        handles.push(tokio::spawn(async move { p.invoke(&d, InvocationRequest::new(ArgumentSnapshot::empty())).await }));
    }
    for h in handles {
        let result = h.await.expect("join").expect("invocation");
        let events = sink.list(result.invocation_id);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.invocation_id == result.invocation_id));
    }
    assert_eq!(sink.invocation_ids().len(), 8);
}
