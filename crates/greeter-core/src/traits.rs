// crates/greeter-core/src/traits.rs

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::GreeterError;
use crate::person::{Greeting, Person};

/// Turns a person into a greeting message. Pure; no I/O.
pub trait GreetingFormatter: Send + Sync {
    fn format_greeting(&self, person: &Person) -> String;
}

/// Creates the greeting artifact for a person.
///
/// Implemented by `services::FormattingGreetingService`.
#[async_trait]
pub trait GreetingService: Send + Sync {
    async fn create_greeting(
        &self,
        ctx: &CallContext,
        person: Person,
    ) -> Result<Greeting, GreeterError>;
}

/// Decides whether a person may be greeted.
#[async_trait]
pub trait GreetingPolicy: Send + Sync {
    /// Returns `Ok(false)` for a business rejection; `Err` when the check
    /// itself could not be performed.
    async fn is_greeting_allowed(
        &self,
        ctx: &CallContext,
        person: &Person,
    ) -> Result<bool, GreeterError>;
}

/// Records greetings for auditing.
#[async_trait]
pub trait GreetingAuditor: Send + Sync {
    async fn record_greeting(
        &self,
        ctx: &CallContext,
        greeting: &Greeting,
    ) -> Result<(), GreeterError>;
}
