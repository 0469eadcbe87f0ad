// crates/greeter-rpc/src/middleware/logging.rs
//
// Observability envelope around every call. Pure observer: whatever the
// inner links return is handed back untouched.

use std::fmt::Debug;
use std::time::Instant;

use async_trait::async_trait;
use tonic::Status;

use greeter_core::{CallContext, SharedLogger};

use crate::chain::{Interceptor, Next};

/// Logs each request on entry and its outcome on exit.
pub struct LoggingInterceptor {
    logger: SharedLogger,
}

impl LoggingInterceptor {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl<Req, Resp> Interceptor<Req, Resp> for LoggingInterceptor
where
    Req: Debug + Send + 'static,
    Resp: Debug + Send + 'static,
{
    async fn intercept(
        &self,
        ctx: CallContext,
        request: Req,
        next: Next<'_, Req, Resp>,
    ) -> Result<Resp, Status> {
        let method = ctx.method().to_owned();
        self.logger.info(format_args!(
            "Received RPC request: method={}, request={:?}",
            method, request
        ));

        let started = Instant::now();
        let result = next.run(ctx, request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(response) => self.logger.info(format_args!(
                "RPC request completed: method={}, response={:?}, elapsed_ms={}",
                method, response, elapsed_ms
            )),
            Err(status) => self.logger.error(format_args!(
                "RPC request failed: method={}, code={:?}, message={}, elapsed_ms={}",
                method,
                status.code(),
                status.message(),
                elapsed_ms
            )),
        }
        result
    }
}
