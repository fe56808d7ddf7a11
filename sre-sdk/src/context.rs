//! Request-scoped cancellation and deadlines
//!
//! Every outbound call takes a `RequestContext`. The call is raced against
//! the context's cancellation token and deadline, and a lost race is
//! reported as a `CancellationError`, never as a transport failure.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a request context stopped accepting work
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation token plus optional deadline for one inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Wrap an existing token, e.g. one owned by a server shutdown hook
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Child context whose deadline is at most `timeout` from now.
    ///
    /// Cancelling the parent cancels the child; the reverse does not hold.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context is already cancelled or past its deadline
    pub fn check(&self) -> Result<(), CancellationError> {
        if self.token.is_cancelled() {
            return Err(CancellationError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CancellationError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the context ends first.
    ///
    /// When the context wins, `fut` is dropped, which aborts any in-flight
    /// HTTP request it owns.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, CancellationError>
    where
        F: Future,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CancellationError::Cancelled),
            _ = deadline => Err(CancellationError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}
