// crates/greeter-core/src/usecase.rs
//
// The greeting use case: check policy, create the greeting, record it for
// auditing. Steps run strictly in that order and the first failure ends the
// call. Nothing is retried here; callers retry by re-issuing the RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::GreeterError;
use crate::logging::SharedLogger;
use crate::person::{Greeting, Person};
use crate::traits::{GreetingAuditor, GreetingPolicy, GreetingService};

/// Entry point the RPC handler calls.
#[async_trait]
pub trait GreetingUseCase: Send + Sync {
    async fn execute(&self, ctx: &CallContext, person: Person) -> Result<Greeting, GreeterError>;
}

/// How an audit failure affects the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Audit failure fails the call; the created greeting is discarded.
    #[default]
    Blocking,
    /// Audit failure is logged and the greeting is still returned.
    BestEffort,
}

/// Policy -> Create -> Audit orchestrator.
pub struct GreetPerson {
    service: Arc<dyn GreetingService>,
    policy: Arc<dyn GreetingPolicy>,
    auditor: Arc<dyn GreetingAuditor>,
    logger: SharedLogger,
    audit_mode: AuditMode,
}

impl GreetPerson {
    pub fn new(
        service: Arc<dyn GreetingService>,
        policy: Arc<dyn GreetingPolicy>,
        auditor: Arc<dyn GreetingAuditor>,
        logger: SharedLogger,
    ) -> Self {
        Self {
            service,
            policy,
            auditor,
            logger,
            audit_mode: AuditMode::default(),
        }
    }

    pub fn with_audit_mode(mut self, mode: AuditMode) -> Self {
        self.audit_mode = mode;
        self
    }
}

#[async_trait]
impl GreetingUseCase for GreetPerson {
    async fn execute(&self, ctx: &CallContext, person: Person) -> Result<Greeting, GreeterError> {
        self.logger.info(format_args!(
            "Executing greeting use case for person: {} {}",
            person.first_name, person.last_name
        ));

        // 1. Policy
        let allowed = match ctx.guard(self.policy.is_greeting_allowed(ctx, &person)).await {
            Ok(allowed) => allowed,
            Err(e) => {
                self.logger
                    .error(format_args!("Error checking greeting policy: {}", e));
                return Err(e);
            }
        };
        if !allowed {
            self.logger.info(format_args!(
                "Greeting not allowed for person: {} {}",
                person.first_name, person.last_name
            ));
            return Err(GreeterError::NotAllowed);
        }

        // 2. Create
        let greeting = match ctx.guard(self.service.create_greeting(ctx, person)).await {
            Ok(greeting) => greeting,
            Err(e) => {
                self.logger.error(format_args!("Error creating greeting: {}", e));
                return Err(e);
            }
        };

        // 3. Audit
        if let Err(e) = ctx.guard(self.auditor.record_greeting(ctx, &greeting)).await {
            self.logger.error(format_args!(
                "Error recording greeting for auditing: {}",
                e
            ));
            // Cancellation always ends the call, whatever the audit mode.
            let cancelled = matches!(e, GreeterError::Cancelled | GreeterError::DeadlineExceeded);
            if self.audit_mode == AuditMode::Blocking || cancelled {
                return Err(e);
            }
        }

        self.logger.info(format_args!(
            "Greeting use case completed successfully for person: {} {}",
            greeting.person.first_name, greeting.person.last_name
        ));
        Ok(greeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAuditor, MockGreetingService, MockPolicy, Outcome, RecordingLogger};
    use crate::services::TemplateFormatter;
    use crate::traits::GreetingFormatter;
    use std::time::Duration;

    struct Fixture {
        service: Arc<MockGreetingService>,
        policy: Arc<MockPolicy>,
        auditor: Arc<MockAuditor>,
        logger: RecordingLogger,
    }

    impl Fixture {
        fn new(policy: Outcome, create: Outcome, audit: Outcome) -> Self {
            Self {
                service: Arc::new(MockGreetingService::new(create)),
                policy: Arc::new(MockPolicy::new(policy)),
                auditor: Arc::new(MockAuditor::new(audit)),
                logger: RecordingLogger::new(),
            }
        }

        fn usecase(&self) -> GreetPerson {
            GreetPerson::new(
                self.service.clone(),
                self.policy.clone(),
                self.auditor.clone(),
                self.logger.shared(),
            )
        }
    }

    fn ctx() -> CallContext {
        CallContext::new("/greeter.Greeter/SayHello")
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let f = Fixture::new(Outcome::Succeed, Outcome::Succeed, Outcome::Succeed);
        let person = Person::new("Ada", "Lovelace", 36);

        let greeting = f.usecase().execute(&ctx(), person.clone()).await.unwrap();

        assert_eq!(greeting.message, TemplateFormatter.format_greeting(&person));
        assert_eq!(greeting.person, person);
        assert_eq!(f.policy.calls(), 1);
        assert_eq!(f.service.calls(), 1);
        assert_eq!(f.auditor.recorded(), vec![greeting]);
        assert!(f.logger.contains("completed successfully"));
    }

    #[tokio::test]
    async fn test_policy_denied_skips_create_and_audit() {
        let f = Fixture::new(Outcome::Deny, Outcome::Succeed, Outcome::Succeed);

        let err = f
            .usecase()
            .execute(&ctx(), Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::NotAllowed);
        assert_eq!(f.service.calls(), 0);
        assert_eq!(f.auditor.calls(), 0);
        assert!(f.logger.contains("Greeting not allowed for person: Zee"));
    }

    #[tokio::test]
    async fn test_policy_error_is_surfaced_unchanged() {
        let f = Fixture::new(
            Outcome::Fail("policy store unreachable".to_string()),
            Outcome::Succeed,
            Outcome::Succeed,
        );

        let err = f
            .usecase()
            .execute(&ctx(), Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::dependency("policy store unreachable"));
        assert_eq!(f.service.calls(), 0);
        assert_eq!(f.auditor.calls(), 0);
        assert_eq!(f.logger.error_count(), 1);
    }

    #[tokio::test]
    async fn test_create_failure_skips_audit() {
        let f = Fixture::new(
            Outcome::Succeed,
            Outcome::Fail("formatter offline".to_string()),
            Outcome::Succeed,
        );

        let err = f
            .usecase()
            .execute(&ctx(), Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::dependency("formatter offline"));
        assert_eq!(f.policy.calls(), 1);
        assert_eq!(f.auditor.calls(), 0);
    }

    #[tokio::test]
    async fn test_audit_failure_blocks_by_default() {
        let f = Fixture::new(
            Outcome::Succeed,
            Outcome::Succeed,
            Outcome::Fail("audit log full".to_string()),
        );

        let err = f
            .usecase()
            .execute(&ctx(), Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::dependency("audit log full"));
        assert_eq!(f.auditor.calls(), 1);
    }

    #[tokio::test]
    async fn test_audit_failure_best_effort_returns_greeting() {
        let f = Fixture::new(
            Outcome::Succeed,
            Outcome::Succeed,
            Outcome::Fail("audit log full".to_string()),
        );

        let greeting = f
            .usecase()
            .with_audit_mode(AuditMode::BestEffort)
            .execute(&ctx(), Person::new("Zee", "", 0))
            .await
            .unwrap();

        assert_eq!(greeting.message, "Hello, Zee !");
        assert!(f.logger.contains("Error recording greeting for auditing"));
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_greetings() {
        let f = Fixture::new(Outcome::Succeed, Outcome::Succeed, Outcome::Succeed);
        let usecase = f.usecase();
        let person = Person::new("Ada", "Lovelace", 36);

        let first = usecase.execute(&ctx(), person.clone()).await.unwrap();
        let second = usecase.execute(&ctx(), person).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cancelled_call_runs_no_steps() {
        let f = Fixture::new(Outcome::Succeed, Outcome::Succeed, Outcome::Succeed);
        let ctx = ctx();
        ctx.cancel_handle().cancel();

        let err = f
            .usecase()
            .execute(&ctx, Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::Cancelled);
        assert_eq!(f.policy.calls(), 0);
        assert_eq!(f.service.calls(), 0);
        assert_eq!(f.auditor.calls(), 0);
    }

    #[tokio::test]
    async fn test_slow_policy_hits_deadline() {
        struct SlowPolicy;

        #[async_trait]
        impl GreetingPolicy for SlowPolicy {
            async fn is_greeting_allowed(
                &self,
                _ctx: &CallContext,
                _person: &Person,
            ) -> Result<bool, GreeterError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(true)
            }
        }

        let service = Arc::new(MockGreetingService::succeeding());
        let usecase = GreetPerson::new(
            service.clone(),
            Arc::new(SlowPolicy),
            Arc::new(MockAuditor::succeeding()),
            RecordingLogger::new().shared(),
        );
        let ctx = ctx().with_timeout(Duration::from_millis(20));

        let err = usecase
            .execute(&ctx, Person::new("Zee", "", 0))
            .await
            .unwrap_err();

        assert_eq!(err, GreeterError::DeadlineExceeded);
        assert_eq!(service.calls(), 0);
    }
}
