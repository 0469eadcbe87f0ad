// crates/greeter-rpc/src/middleware/recovery.rs
//
// Panic barrier around the rest of the chain. A panic anywhere below this
// interceptor (handler, use case, domain services) becomes an INTERNAL
// status for that one call; the connection and the process carry on.
//
// The barrier wraps every poll of the downstream future in `catch_unwind`.
// While a poll is inside a barrier, the process panic hook stashes the panic
// location and a backtrace in a thread-local so the diagnostic can point at
// the real fault site rather than at this interceptor. Panics outside any
// barrier go to the previously installed hook unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::future::BoxFuture;
use tonic::Status;

use greeter_core::{CallContext, SharedLogger};

use crate::chain::{Interceptor, Next};

/// Longest panic message excerpt returned to the caller.
const SUMMARY_MAX_CHARS: usize = 120;

thread_local! {
    static BARRIER_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT_SITE: RefCell<Option<FaultSite>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

struct FaultSite {
    location: Option<String>,
    backtrace: Backtrace,
}

fn install_panic_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if BARRIER_DEPTH.with(Cell::get) > 0 {
                let site = FaultSite {
                    location: info.location().map(|l| l.to_string()),
                    backtrace: Backtrace::force_capture(),
                };
                LAST_FAULT_SITE.with(|slot| *slot.borrow_mut() = Some(site));
            } else {
                previous(info);
            }
        }));
    });
}

/// A panic caught by the barrier.
#[derive(Debug)]
pub struct Fault {
    message: String,
    location: Option<String>,
    backtrace: Option<String>,
}

impl Fault {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        let site = LAST_FAULT_SITE.with(|slot| slot.borrow_mut().take());
        Self {
            message,
            location: site.as_ref().and_then(|s| s.location.clone()),
            backtrace: site.map(|s| s.backtrace.to_string()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the panic message, cut to a bounded length. This is all
    /// the caller gets to see.
    pub fn summary(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or_default();
        let mut summary: String = first_line.chars().take(SUMMARY_MAX_CHARS).collect();
        if first_line.chars().count() > SUMMARY_MAX_CHARS {
            summary.push_str("...");
        }
        summary
    }
}

/// Future adapter that turns a panic during `poll` into `Err(Fault)`.
struct PanicBarrier<'a, T> {
    inner: BoxFuture<'a, T>,
}

impl<T> Future for PanicBarrier<'_, T> {
    type Output = Result<T, Fault>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = &mut self.inner;
        BARRIER_DEPTH.with(|d| d.set(d.get() + 1));
        let polled = panic::catch_unwind(AssertUnwindSafe(|| inner.as_mut().poll(cx)));
        BARRIER_DEPTH.with(|d| d.set(d.get() - 1));

        match polled {
            Ok(Poll::Ready(value)) => Poll::Ready(Ok(value)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(Fault::from_payload(payload))),
        }
    }
}

/// Converts downstream panics into INTERNAL statuses.
pub struct RecoveryInterceptor {
    logger: SharedLogger,
}

impl RecoveryInterceptor {
    /// Create the interceptor. Installs the fault-site panic hook on first use.
    pub fn new(logger: SharedLogger) -> Self {
        install_panic_hook();
        Self { logger }
    }
}

#[async_trait]
impl<Req, Resp> Interceptor<Req, Resp> for RecoveryInterceptor
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn intercept(
        &self,
        ctx: CallContext,
        request: Req,
        next: Next<'_, Req, Resp>,
    ) -> Result<Resp, Status> {
        let method = ctx.method().to_owned();
        let barrier = PanicBarrier {
            inner: Box::pin(next.run(ctx, request)),
        };

        match barrier.await {
            Ok(result) => result,
            Err(fault) => {
                self.logger.error(format_args!(
                    "Recovered from panic during RPC call {}: {}\nLocation: {}\nStack:\n{}",
                    method,
                    fault.message(),
                    fault.location.as_deref().unwrap_or("unknown"),
                    fault.backtrace.as_deref().unwrap_or("unavailable"),
                ));
                Err(Status::internal(format!(
                    "internal server error: {}",
                    fault.summary()
                )))
            }
        }
    }
}
