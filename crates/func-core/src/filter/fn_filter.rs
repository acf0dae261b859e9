//! `FnFilter`: filtro construido a partir de closures síncronas.

use std::sync::Arc;

use async_trait::async_trait;

use super::InvocationFilter;
use crate::errors::FunctionError;
use crate::model::{ExecutedContext, ExecutingContext};

type BeforeHook = Arc<dyn Fn(&ExecutingContext) -> Result<(), FunctionError> + Send + Sync>;
type AfterHook = Arc<dyn Fn(&ExecutedContext) -> Result<(), FunctionError> + Send + Sync>;

/// Filtro declarado con closures. Los hooks ausentes son no-ops.
#[derive(Clone)]
pub struct FnFilter {
    name: String,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
}

impl FnFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               before: None,
               after: None }
    }

    pub fn before<F>(mut self, hook: F) -> Self
        where F: Fn(&ExecutingContext) -> Result<(), FunctionError> + Send + Sync + 'static
    {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn after<F>(mut self, hook: F) -> Self
        where F: Fn(&ExecutedContext) -> Result<(), FunctionError> + Send + Sync + 'static
    {
        self.after = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for FnFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}

#[async_trait]
impl InvocationFilter for FnFilter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_executing(&self, ctx: &ExecutingContext) -> Result<(), FunctionError> {
        match &self.before {
            Some(hook) => hook(ctx),
            None => Ok(()),
        }
    }

    async fn on_executed(&self, ctx: &ExecutedContext) -> Result<(), FunctionError> {
        match &self.after {
            Some(hook) => hook(ctx),
            None => Ok(()),
        }
    }
}
