use std::future::{Future, pending};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{ToDoError, ToDoResult};

/// Deadline and cancellation signal for a single service call.
///
/// Transport bindings build one per request. The service runs every
/// connection-acquire and store step through [`CallContext::run`], so an
/// expired deadline or a fired cancel signal abandons the step instead of
/// waiting on the store.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl CallContext {
    /// No deadline, no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel the call once `true` is sent on the channel.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `fut` unless the call is cancelled or its deadline passes first.
    ///
    /// Cancellation wins over the deadline, and both win over a future that
    /// is ready at the same time.
    pub async fn run<F: Future>(&self, fut: F) -> ToDoResult<F::Output> {
        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped sender can never cancel.
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(ToDoError::Cancelled("call cancelled by the caller".into())),
            _ = expired => Err(ToDoError::DeadlineExceeded("deadline exceeded before the call completed".into())),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_limits_runs_to_completion() {
        let ctx = CallContext::new();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_slow_future() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert!(matches!(result, Err(ToDoError::DeadlineExceeded(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_wins_over_ready_future() {
        let ctx = CallContext::new().with_deadline(Instant::now());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(matches!(ctx.run(async { 1 }).await, Err(ToDoError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_cancel_signal() {
        let (tx, rx) = watch::channel(false);
        let ctx = CallContext::new().with_cancellation(rx);
        assert!(!ctx.is_cancelled());

        tx.send(true).unwrap();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.run(pending::<()>()).await, Err(ToDoError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_dropped_sender_never_cancels() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let ctx = CallContext::new().with_cancellation(rx);
        assert_eq!(ctx.run(async { "done" }).await, Ok("done"));
    }
}
