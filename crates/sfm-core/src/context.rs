//! Cancellation and deadlines for remote calls
//!
//! Every store call the engine issues is raced against the caller's
//! [`CallContext`]. When the token fires or the deadline passes the call
//! future is dropped and the engine stops; nothing is rolled back.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a call did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Cancellation token plus optional deadline threaded through every call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never cancels on its own
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing token, e.g. one wired to Ctrl-C
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline relative to now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Drive `call` to completion unless the context fires first.
    ///
    /// Cancellation is checked before the call is polled, so an already
    /// cancelled context never starts a call.
    pub async fn run<F, T>(&self, call: F) -> std::result::Result<T, Interrupt>
    where
        F: Future<Output = T>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupt::Cancelled),
            _ = deadline => Err(Interrupt::DeadlineExceeded),
            output = call => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn run_completes_without_interrupt() {
        let ctx = CallContext::new();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn cancelled_context_never_polls_the_call() {
        let ctx = CallContext::new();
        ctx.cancel();

        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let result = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Err(Interrupt::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn deadline_interrupts_a_hanging_call() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));
        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupt::DeadlineExceeded));
    }
}
