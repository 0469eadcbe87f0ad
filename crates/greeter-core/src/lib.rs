// crates/greeter-core/src/lib.rs
//
// greeter-core: Domain types, service traits, and the greeting use case for
// the Greeter service.
//
// This is the leaf crate of the workspace. It owns the `Person`/`Greeting`
// entities, the validation capabilities, the error taxonomy, the per-call
// context, the logger port, and the Policy -> Create -> Audit orchestrator.

pub mod context;
pub mod error;
pub mod logging;
pub mod mocks;
pub mod person;
pub mod services;
pub mod traits;
pub mod usecase;
pub mod validation;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use greeter_core::Person;`

pub use context::{CallContext, CancelHandle};
pub use error::{GreeterError, ValidationError};
pub use logging::{Logger, SharedLogger, TracingLogger};
pub use person::{Greeting, Person};
pub use services::{AllowAllPolicy, FormattingGreetingService, LoggingAuditor, TemplateFormatter};
pub use traits::{GreetingAuditor, GreetingFormatter, GreetingPolicy, GreetingService};
pub use usecase::{AuditMode, GreetPerson, GreetingUseCase};
pub use validation::{Capability, QuickCheck, StrictValidate, Validatable};
