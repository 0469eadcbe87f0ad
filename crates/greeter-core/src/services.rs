// crates/greeter-core/src/services.rs
//
// Default domain services wired by the daemon: a template formatter, the
// greeting service built on it, an allow-all policy, and a log-backed auditor.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::GreeterError;
use crate::logging::SharedLogger;
use crate::person::{Greeting, Person};
use crate::traits::{GreetingAuditor, GreetingFormatter, GreetingPolicy, GreetingService};

/// Formats `"Hello, {first} {last}!"`.
///
/// An empty last name leaves the separating space in place, so a person with
/// only a first name is greeted as `"Hello, Zee !"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFormatter;

impl GreetingFormatter for TemplateFormatter {
    fn format_greeting(&self, person: &Person) -> String {
        format!("Hello, {} {}!", person.first_name, person.last_name)
    }
}

/// Greeting service that delegates message text to a formatter.
pub struct FormattingGreetingService<F> {
    formatter: F,
    logger: SharedLogger,
}

impl<F: GreetingFormatter> FormattingGreetingService<F> {
    pub fn new(formatter: F, logger: SharedLogger) -> Self {
        Self { formatter, logger }
    }
}

#[async_trait]
impl<F: GreetingFormatter> GreetingService for FormattingGreetingService<F> {
    async fn create_greeting(
        &self,
        _ctx: &CallContext,
        person: Person,
    ) -> Result<Greeting, GreeterError> {
        self.logger.info(format_args!(
            "Creating greeting for person: {} {}",
            person.first_name, person.last_name
        ));

        let message = self.formatter.format_greeting(&person);
        let greeting = Greeting { message, person };

        self.logger
            .info(format_args!("Generated greeting: {}", greeting.message));
        Ok(greeting)
    }
}

/// Policy that allows every greeting.
pub struct AllowAllPolicy {
    logger: SharedLogger,
}

impl AllowAllPolicy {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl GreetingPolicy for AllowAllPolicy {
    async fn is_greeting_allowed(
        &self,
        _ctx: &CallContext,
        person: &Person,
    ) -> Result<bool, GreeterError> {
        self.logger.debug(format_args!(
            "Checking greeting policy for person: {} {}",
            person.first_name, person.last_name
        ));
        Ok(true)
    }
}

/// Auditor that records each greeting as an info-level log entry.
pub struct LoggingAuditor {
    logger: SharedLogger,
}

impl LoggingAuditor {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl GreetingAuditor for LoggingAuditor {
    async fn record_greeting(
        &self,
        _ctx: &CallContext,
        greeting: &Greeting,
    ) -> Result<(), GreeterError> {
        self.logger.info(format_args!(
            "AUDIT: Recorded greeting '{}' for {} {}",
            greeting.message, greeting.person.first_name, greeting.person.last_name
        ));
        Ok(())
    }
}
