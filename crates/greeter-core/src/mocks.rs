// crates/greeter-core/src/mocks.rs
//
// Test doubles for the logger port and the domain services. Each double
// counts its invocations so tests can assert which pipeline steps ran.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::GreeterError;
use crate::logging::{Logger, SharedLogger};
use crate::person::{Greeting, Person};
use crate::services::TemplateFormatter;
use crate::traits::{GreetingAuditor, GreetingFormatter, GreetingPolicy, GreetingService};

/// Log severity captured by `RecordingLogger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Debug,
}

/// Logger that keeps every entry in memory.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> SharedLogger {
        Arc::new(self.clone())
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.lock().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn info_count(&self) -> usize {
        self.count(Level::Info)
    }

    pub fn error_count(&self) -> usize {
        self.count(Level::Error)
    }

    /// True if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|(_, line)| line.contains(needle))
    }

    fn push(&self, level: Level, args: fmt::Arguments<'_>) {
        self.lock().push((level, args.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // A panicking test thread must not hide the log from the assertions.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Logger for RecordingLogger {
    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Info, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Error, args);
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.push(Level::Debug, args);
    }
}

/// Scripted result for a mocked step.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed,
    /// Policy only: answer "not allowed".
    Deny,
    Fail(String),
    Panic(String),
}

/// Policy double returning a scripted outcome.
#[derive(Debug)]
pub struct MockPolicy {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl MockPolicy {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn allowing() -> Self {
        Self::new(Outcome::Succeed)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GreetingPolicy for MockPolicy {
    async fn is_greeting_allowed(
        &self,
        _ctx: &CallContext,
        _person: &Person,
    ) -> Result<bool, GreeterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Succeed => Ok(true),
            Outcome::Deny => Ok(false),
            Outcome::Fail(reason) => Err(GreeterError::dependency(reason.clone())),
            Outcome::Panic(msg) => panic!("{}", msg),
        }
    }
}

/// Greeting service double that formats with `TemplateFormatter` unless
/// scripted to fail.
#[derive(Debug)]
pub struct MockGreetingService {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl MockGreetingService {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Outcome::Succeed)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GreetingService for MockGreetingService {
    async fn create_greeting(
        &self,
        _ctx: &CallContext,
        person: Person,
    ) -> Result<Greeting, GreeterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Fail(reason) => Err(GreeterError::dependency(reason.clone())),
            Outcome::Panic(msg) => panic!("{}", msg),
            Outcome::Succeed | Outcome::Deny => Ok(Greeting {
                message: TemplateFormatter.format_greeting(&person),
                person,
            }),
        }
    }
}

/// Auditor double that records what it was asked to audit.
#[derive(Debug)]
pub struct MockAuditor {
    outcome: Outcome,
    recorded: Mutex<Vec<Greeting>>,
}

impl MockAuditor {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Outcome::Succeed)
    }

    pub fn calls(&self) -> usize {
        self.recorded.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn recorded(&self) -> Vec<Greeting> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GreetingAuditor for MockAuditor {
    async fn record_greeting(
        &self,
        _ctx: &CallContext,
        greeting: &Greeting,
    ) -> Result<(), GreeterError> {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(greeting.clone());
        }
        match &self.outcome {
            Outcome::Fail(reason) => Err(GreeterError::dependency(reason.clone())),
            Outcome::Panic(msg) => panic!("{}", msg),
            Outcome::Succeed | Outcome::Deny => Ok(()),
        }
    }
}
