// crates/greeter-rpc/src/middleware/validation.rs
//
// Rejects structurally invalid requests before they reach business logic.
// Works for any request type implementing `Validatable`; the capability the
// type reports decides which check runs.

use async_trait::async_trait;
use tonic::Status;

use greeter_core::validation::{evaluate, Verdict};
use greeter_core::{CallContext, SharedLogger, Validatable};

use crate::chain::{Interceptor, Next};

/// Validation gate. Logs only on rejection.
pub struct ValidationInterceptor {
    logger: SharedLogger,
}

impl ValidationInterceptor {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl<Req, Resp> Interceptor<Req, Resp> for ValidationInterceptor
where
    Req: Validatable + Send + 'static,
    Resp: Send + 'static,
{
    async fn intercept(
        &self,
        ctx: CallContext,
        request: Req,
        next: Next<'_, Req, Resp>,
    ) -> Result<Resp, Status> {
        match evaluate(&request) {
            Verdict::Invalid(e) => {
                self.logger.error(format_args!(
                    "Validation failed for {}: {}",
                    ctx.method(),
                    e
                ));
                return Err(Status::invalid_argument(format!("validation failed: {}", e)));
            }
            Verdict::Rejected => {
                self.logger.error(format_args!(
                    "Validation failed for {}: is_valid() returned false",
                    ctx.method()
                ));
                return Err(Status::invalid_argument("invalid request"));
            }
            Verdict::Valid | Verdict::Unchecked => {}
        }

        next.run(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainBuilder;
    use crate::middleware::test_support::CountingHandler;
    use crate::proto::HelloRequest;
    use greeter_core::mocks::RecordingLogger;
    use greeter_core::{Capability, Person};
    use tonic::Code;

    #[derive(Debug)]
    struct QuickOnly(bool);

    impl greeter_core::QuickCheck for QuickOnly {
        fn is_valid(&self) -> bool {
            self.0
        }
    }

    impl Validatable for QuickOnly {
        fn capability(&self) -> Capability<'_> {
            Capability::Quick(self)
        }
    }

    async fn run<Req>(request: Req) -> (Result<String, Status>, CountingHandler, RecordingLogger)
    where
        Req: Validatable + std::fmt::Debug + Send + 'static,
    {
        let logger = RecordingLogger::new();
        let handler = CountingHandler::default();
        let chain = ChainBuilder::<Req, String>::new()
            .interceptor(ValidationInterceptor::new(logger.shared()))
            .handler(handler.clone())
            .build()
            .unwrap();
        let result = chain.call(CallContext::new("/greeter.Test/Check"), request).await;
        (result, handler, logger)
    }

    #[tokio::test]
    async fn test_strict_failure_rejects_before_handler() {
        let (result, handler, logger) = run(Person::new("Zee", "", 0)).await;

        let status = result.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "validation failed: last name cannot be empty");
        assert_eq!(handler.calls(), 0);
        assert_eq!(logger.error_count(), 1);
        assert!(logger.contains("Validation failed for /greeter.Test/Check"));
    }

    #[tokio::test]
    async fn test_strict_success_reaches_handler() {
        let (result, handler, logger) = run(Person::new("Ada", "Lovelace", 36)).await;

        assert!(result.is_ok());
        assert_eq!(handler.calls(), 1);
        assert!(logger.entries().is_empty());
    }

    #[tokio::test]
    async fn test_quick_check_failure_is_generic() {
        let (result, handler, logger) = run(QuickOnly(false)).await;

        let status = result.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "invalid request");
        assert_eq!(handler.calls(), 0);
        assert_eq!(logger.error_count(), 1);
    }

    #[tokio::test]
    async fn test_quick_check_success_reaches_handler() {
        let (result, handler, _) = run(QuickOnly(true)).await;
        assert_eq!(result.unwrap(), "QuickOnly(true)");
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_without_capability_passes_through() {
        let (result, handler, logger) = run(HelloRequest {
            name: String::new(),
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(handler.calls(), 1);
        assert!(logger.entries().is_empty());
    }
}
