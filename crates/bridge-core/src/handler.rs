use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::event::{InvocationContext, InvocationEvent, InvocationResult};

type HandlerFuture = dyn Future<Output = anyhow::Result<Option<InvocationResult>>> + Send;
type HandlerInvoker =
    dyn Fn(InvocationEvent, InvocationContext) -> Pin<Box<HandlerFuture>> + Send + Sync;

/// A function following the `handler(event, context)` serverless convention.
///
/// Returning `Ok(None)` stands for a handler that resolved to nothing; the
/// adapter then answers with an empty 200.
#[async_trait]
pub trait LegacyHandler: Send + Sync {
    async fn call(
        &self,
        event: InvocationEvent,
        context: InvocationContext,
    ) -> anyhow::Result<Option<InvocationResult>>;
}

/// Closure-backed [`LegacyHandler`].
pub struct FnHandler {
    inner: Arc<HandlerInvoker>,
}

impl FnHandler {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Send + Sync + 'static + Fn(InvocationEvent, InvocationContext) -> Fut,
        Fut: Future<Output = anyhow::Result<Option<InvocationResult>>> + Send + 'static,
    {
        let invoker: Arc<HandlerInvoker> =
            Arc::new(move |event: InvocationEvent, context: InvocationContext| {
                let fut = func(event, context);
                Box::pin(fut) as Pin<Box<HandlerFuture>>
            });
        Self { inner: invoker }
    }

    pub fn into_arc(self) -> Arc<dyn LegacyHandler> {
        Arc::new(self)
    }
}

#[async_trait]
impl LegacyHandler for FnHandler {
    async fn call(
        &self,
        event: InvocationEvent,
        context: InvocationContext,
    ) -> anyhow::Result<Option<InvocationResult>> {
        (self.inner)(event, context).await
    }
}
