//! Request-scoped cancellation and deadlines
//!
//! Every async trait method takes a [`Context`] as its first parameter.
//! Implementations check it before remote calls so that a cancelled
//! Terraform run stops issuing requests.

use crate::error::{Result, TfplugError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Derive a context that is cancelled once `timeout` has elapsed
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = watch::channel(self.is_cancelled());

        let timer_tx = done_tx.clone();
        let mut parent = self.done();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                _ = parent.wait_for(|cancelled| *cancelled) => {}
            }
            let _ = timer_tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done: done_rx,
                done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver that flips to `true` when work on behalf of this context
    /// should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Err when the context has been cancelled or its deadline has passed
    pub fn check(&self) -> Result<()> {
        let expired = self
            .inner
            .deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false);
        if self.is_cancelled() || expired {
            return Err(TfplugError::Cancelled);
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn context_timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));

        assert!(!ctx.is_cancelled());
        assert!(ctx.check().is_ok());

        sleep(Duration::from_millis(120)).await;

        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(TfplugError::Cancelled)));
    }

    #[tokio::test]
    async fn context_manual_cancel() {
        let ctx = Context::new();
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());

        ctx.cancel();

        assert!(clone.is_cancelled());
        assert!(clone.check().is_err());
    }

    #[tokio::test]
    async fn parent_cancel_reaches_child() {
        let parent = Context::new();
        let child = parent.clone().with_timeout(Duration::from_secs(60));

        parent.cancel();
        let mut done = child.done();
        let _ = time::timeout(Duration::from_secs(1), done.wait_for(|c| *c)).await;

        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn context_deadline() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());

        let ctx_with_timeout = ctx.with_timeout(Duration::from_secs(1));
        assert!(ctx_with_timeout.deadline().is_some());
    }
}
