// crates/greeter-rpc/src/chain.rs
//
// Unary interceptor chain. Interceptors are composed around a terminal
// handler in onion order: the first interceptor added is the outermost, so
// its "before" logic runs first and its "after" logic runs last.
//
// The chain is built once at server start and is immutable afterwards; every
// call walks the same slice of interceptors.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tonic::Status;

use greeter_core::CallContext;

/// Terminal link of a chain: turns a request into a response.
#[async_trait]
pub trait UnaryHandler<Req, Resp>: Send + Sync {
    async fn handle(&self, ctx: CallContext, request: Req) -> Result<Resp, Status>;
}

/// A request-wrapping link. May reject the request, call `next`, and
/// inspect or replace whatever `next` returns.
#[async_trait]
pub trait Interceptor<Req, Resp>: Send + Sync {
    async fn intercept(
        &self,
        ctx: CallContext,
        request: Req,
        next: Next<'_, Req, Resp>,
    ) -> Result<Resp, Status>;
}

/// The remainder of the chain after the current interceptor.
pub struct Next<'a, Req, Resp> {
    interceptors: &'a [Arc<dyn Interceptor<Req, Resp>>],
    handler: &'a dyn UnaryHandler<Req, Resp>,
}

impl<'a, Req, Resp> Next<'a, Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Invoke the next link with the given context and request.
    pub async fn run(self, ctx: CallContext, request: Req) -> Result<Resp, Status> {
        match self.interceptors.split_first() {
            Some((first, rest)) => {
                let next = Next {
                    interceptors: rest,
                    handler: self.handler,
                };
                first.intercept(ctx, request, next).await
            }
            None => self.handler.handle(ctx, request).await,
        }
    }
}

/// Errors raised while assembling a chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("interceptor chain has no terminal handler")]
    MissingHandler,
}

/// Interceptors composed around a handler.
pub struct Chain<Req, Resp> {
    interceptors: Vec<Arc<dyn Interceptor<Req, Resp>>>,
    handler: Arc<dyn UnaryHandler<Req, Resp>>,
}

impl<Req, Resp> std::fmt::Debug for Chain<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl<Req, Resp> Chain<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Run one call through every interceptor and the handler.
    pub async fn call(&self, ctx: CallContext, request: Req) -> Result<Resp, Status> {
        let next = Next {
            interceptors: &self.interceptors,
            handler: self.handler.as_ref(),
        };
        next.run(ctx, request).await
    }

    /// Number of interceptors (the handler is not counted).
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

/// Builder for `Chain`. Interceptors run in the order they are added.
pub struct ChainBuilder<Req, Resp> {
    interceptors: Vec<Arc<dyn Interceptor<Req, Resp>>>,
    handler: Option<Arc<dyn UnaryHandler<Req, Resp>>>,
}

impl<Req, Resp> Default for ChainBuilder<Req, Resp> {
    fn default() -> Self {
        Self {
            interceptors: Vec::new(),
            handler: None,
        }
    }
}

impl<Req, Resp> ChainBuilder<Req, Resp> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor; it wraps everything added after it.
    pub fn interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: Interceptor<Req, Resp> + 'static,
    {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn handler<H>(self, handler: H) -> Self
    where
        H: UnaryHandler<Req, Resp> + 'static,
    {
        self.shared_handler(Arc::new(handler))
    }

    pub fn shared_handler(mut self, handler: Arc<dyn UnaryHandler<Req, Resp>>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<Chain<Req, Resp>, ChainError> {
        let handler = self.handler.ok_or(ChainError::MissingHandler)?;
        Ok(Chain {
            interceptors: self.interceptors,
            handler,
        })
    }
}
