// crates/greeter-core/src/context.rs
//
// Per-call context: method name, deadline, cancellation signal, and request
// metadata. Cloning is cheap; all clones observe the same cancellation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::GreeterError;

/// Context carried by every call through the interceptor chain and into the
/// use case.
#[derive(Debug, Clone)]
pub struct CallContext {
    method: Arc<str>,
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
    metadata: Arc<HashMap<String, String>>,
}

/// Handle used to cancel a call from outside the call's own task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

impl CallContext {
    /// Create a context for a call to the given full method name
    /// (e.g. `/greeter.Greeter/SayHello`).
    pub fn new(method: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            method: Arc::from(method.into()),
            deadline: None,
            cancel: Arc::new(tx),
            metadata: Arc::new(HashMap::new()),
        }
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.metadata).insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel: self.cancel.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Fail fast if the call was cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), GreeterError> {
        if self.is_cancelled() {
            return Err(GreeterError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(GreeterError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves once the call is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `work` unless the call is cancelled or times out first.
    pub async fn guard<T, F>(&self, work: F) -> Result<T, GreeterError>
    where
        F: Future<Output = Result<T, GreeterError>>,
    {
        self.check()?;
        let deadline = self.deadline;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(GreeterError::Cancelled),
            _ = sleep_until(deadline) => Err(GreeterError::DeadlineExceeded),
            result = work => result,
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
