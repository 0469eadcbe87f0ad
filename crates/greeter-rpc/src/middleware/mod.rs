// crates/greeter-rpc/src/middleware/mod.rs
//
// Standard interceptors installed in front of every Greeter handler.
//
// Composition order is fixed: Validation -> Logging -> Recovery -> handler.
// Validation rejects bad requests before they are logged as accepted work,
// and Recovery sits closest to the handler so its barrier covers the handler
// and every domain service it calls.

pub mod logging;
pub mod recovery;
pub mod validation;

pub use logging::LoggingInterceptor;
pub use recovery::RecoveryInterceptor;
pub use validation::ValidationInterceptor;

use std::fmt::Debug;
use std::sync::Arc;

use greeter_core::{SharedLogger, Validatable};

use crate::chain::{Chain, ChainBuilder, ChainError, UnaryHandler};

/// Build the standard chain around `handler`.
pub fn standard_chain<Req, Resp>(
    handler: Arc<dyn UnaryHandler<Req, Resp>>,
    logger: SharedLogger,
) -> Result<Chain<Req, Resp>, ChainError>
where
    Req: Validatable + Debug + Send + 'static,
    Resp: Debug + Send + 'static,
{
    ChainBuilder::new()
        .interceptor(ValidationInterceptor::new(logger.clone()))
        .interceptor(LoggingInterceptor::new(logger.clone()))
        .interceptor(RecoveryInterceptor::new(logger))
        .shared_handler(handler)
        .build()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tonic::Status;

    use greeter_core::CallContext;

    use crate::chain::UnaryHandler;

    /// Handler that counts calls and echoes the request's Debug form.
    /// Panics when the request's Debug form contains "boom".
    #[derive(Clone, Default)]
    pub struct CountingHandler {
        pub calls: Arc<AtomicUsize>,
    }

    impl CountingHandler {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<Req> UnaryHandler<Req, String> for CountingHandler
    where
        Req: std::fmt::Debug + Send + 'static,
    {
        async fn handle(&self, _ctx: CallContext, request: Req) -> Result<String, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = format!("{:?}", request);
            if text.contains("boom") {
                panic!("handler exploded on {}", text);
            }
            if text.contains("fail") {
                return Err(Status::not_found("no such greeting"));
            }
            Ok(text)
        }
    }
}
