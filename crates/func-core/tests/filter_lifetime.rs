
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use func_core::{ArgumentSnapshot, CancellationSignal, ExecutedContext, ExecutingContext, FnBody, FunctionBody, FunctionDescriptor,
                FunctionError, InvocationContext, InvocationFilter, InvocationPipeline, InvocationRequest, PropertyBag};
use serde_json::{json, Value};
use test_support::Trace;
use uuid::Uuid;

/// Filtro singleton que cuenta construcciones y llamadas. El contador de
/// llamadas es atómico: el filtro se comparte entre invocaciones concurrentes
/// y el pipeline no lo serializa.
struct CountingFilter {
    calls: Arc<AtomicUsize>,
}

impl CountingFilter {
    fn new(constructed: &Arc<AtomicUsize>, calls: &Arc<AtomicUsize>) -> Self {
        constructed.fetch_add(1, Ordering::SeqCst);
        Self { calls: calls.clone() }
    }
}

#[async_trait]
impl InvocationFilter for CountingFilter {
    async fn on_executing(&self, _ctx: &ExecutingContext) -> Result<(), FunctionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Destino por invocación que deja una marca al construirse.
struct MarkedTarget;

impl MarkedTarget {
    fn new(trace: &Trace) -> Self {
        trace.push("constructed");
        Self
    }
}

#[async_trait]
impl FunctionBody for MarkedTarget {
    async fn invoke(&self, _ctx: InvocationContext, _c: CancellationSignal) -> Result<Value, FunctionError> {
        Ok(Value::Null)
    }
}

#[async_trait]
impl InvocationFilter for MarkedTarget {
    fn name(&self) -> &str {
        "marked"
    }
}

type BagLog = Arc<Mutex<Vec<(Uuid, &'static str, PropertyBag)>>>;

struct BagFilter {
    label: &'static str,
    log: BagLog,
}

#[async_trait]
impl InvocationFilter for BagFilter {
    fn name(&self) -> &str {
        self.label
    }

    async fn on_executing(&self, ctx: &ExecutingContext) -> Result<(), FunctionError> {
        self.log.lock().unwrap().push((ctx.invocation_id(), self.label, ctx.properties().clone()));
        ctx.properties().insert(self.label, json!("seen"));
        Ok(())
    }

    async fn on_executed(&self, ctx: &ExecutedContext) -> Result<(), FunctionError> {
        self.log.lock().unwrap().push((ctx.invocation_id(), self.label, ctx.properties().clone()));
        Ok(())
    }
}

#[tokio::test]
async fn group_and_unit_filters_are_constructed_once_per_descriptor() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (c1, k1, c2, k2) = (constructed.clone(), calls.clone(), constructed.clone(), calls.clone());
    let descriptor = FunctionDescriptor::builder("count", "Count").group_filter_with(move || CountingFilter::new(&c1, &k1))
                                                                  .unit_filter_with(move || CountingFilter::new(&c2, &k2))
                                                                  .body(FnBody::new(|_ctx, _c| async { Ok(Value::Null) }))
                                                                  .build()
                                                                  .expect("descriptor");
    assert_eq!(constructed.load(Ordering::SeqCst), 2, "one construction per declared filter");

    let pipeline = InvocationPipeline::new();
    for _ in 0..3 {
        pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                .await
                .expect("invocation");
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn instance_filters_are_constructed_fresh_per_invocation() {
    let trace = Trace::default();
    let t = trace.clone();
    let descriptor = FunctionDescriptor::builder("inst", "Instance").filtered_instance(move || MarkedTarget::new(&t))
                                                                    .build()
                                                                    .expect("descriptor");
    assert!(descriptor.has_instance_filter());
    assert!(trace.entries().is_empty(), "instances are not built with the descriptor");

    let pipeline = InvocationPipeline::new();
    for _ in 0..3 {
        pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                .await
                .expect("invocation");
    }
    assert_eq!(trace.entries(), vec!["constructed"; 3]);
}

#[tokio::test]
async fn property_bag_is_shared_within_and_isolated_across_invocations() {
    let log: BagLog = Arc::default();
    let body_log = log.clone();
    let descriptor = FunctionDescriptor::builder("bag", "Bag").group_filter(BagFilter { label: "G",
                                                                                         log: log.clone() })
                                                              .unit_filter(BagFilter { label: "U",
                                                                                       log: log.clone() })
                                                              .body(FnBody::new(move |ctx, _c| {
                                                                  let log = body_log.clone();
                                                                  async move {
                                                                      let saw_pre = ctx.properties().contains_key("G")
                                                                                    && ctx.properties().contains_key("U");
                                                                      log.lock().unwrap().push((ctx.invocation_id(), "body", ctx.properties().clone()));
                                                                      Ok(json!(saw_pre))
                                                                  }
                                                              }))
                                                              .build()
                                                              .expect("descriptor");

    let pipeline = InvocationPipeline::new();
    let first = pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                        .await
                        .expect("first");
    let second = pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
                         .await
                         .expect("second");
    assert_eq!(first.output, Some(json!(true)), "body sees values written by pre-hooks");

    let entries = log.lock().unwrap().clone();
    // G pre, U pre, body, U post, G post por invocación
    assert_eq!(entries.len(), 10);
    for id in [first.invocation_id, second.invocation_id] {
        let bags: Vec<&PropertyBag> = entries.iter().filter(|(i, _, _)| *i == id).map(|(_, _, b)| b).collect();
        assert_eq!(bags.len(), 5);
        assert!(bags.windows(2).all(|w| w[0].ptr_eq(w[1])), "same bag for every participant");
    }
    let first_bag = entries.iter().find(|(i, _, _)| *i == first.invocation_id).map(|(_, _, b)| b.clone()).unwrap();
    let second_bag = entries.iter().find(|(i, _, _)| *i == second.invocation_id).map(|(_, _, b)| b.clone()).unwrap();
    assert!(!first_bag.ptr_eq(&second_bag), "bags never shared across invocations");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_share_singletons_without_serialization() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let (c, k) = (constructed.clone(), calls.clone());
    let descriptor = Arc::new(FunctionDescriptor::builder("conc", "Concurrent").unit_filter_with(move || CountingFilter::new(&c, &k))
                                                                               .body(FnBody::new(|ctx, _c| async move {
                                                                                   tokio::task::yield_now().await;
                                                                                   Ok(json!(ctx.invocation_id().to_string()))
                                                                               }))
                                                                               .build()
                                                                               .expect("descriptor"));
    let pipeline = Arc::new(InvocationPipeline::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let (p, d) = (pipeline.clone(), descriptor.clone());
        handles.push(tokio::spawn(async move {
                         p.invoke(&d, InvocationRequest::new(ArgumentSnapshot::empty())).await
                     }));
    }
    let mut ids = std::collections::HashSet::new();
    for h in handles {
        let result = h.await.expect("join").expect("invocation");
        ids.insert(result.invocation_id);
    }
    assert_eq!(ids.len(), 16);
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn plain_instance_is_fresh_per_invocation_but_not_a_filter() {
    let trace = Trace::default();
    let t = trace.clone();
    let descriptor = FunctionDescriptor::builder("plain", "Plain").instance(move || MarkedTarget::new(&t))
                                                                  .build()
                                                                  .expect("descriptor");
    assert!(!descriptor.has_instance_filter());
    let instance = descriptor.instantiate();
    assert!(instance.filter.is_none());

    let pipeline = InvocationPipeline::new();
    pipeline.invoke(&descriptor, InvocationRequest::new(ArgumentSnapshot::empty()))
            .await
            .expect("invocation");
    // una construcción por `instantiate` explícito y otra por la invocación
    assert_eq!(trace.entries(), vec!["constructed"; 2]);
}
