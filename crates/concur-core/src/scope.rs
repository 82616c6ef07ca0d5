//! Cancellable execution scopes with optional deadlines.
//!
//! A [`Scope`] pairs a [`CancellationToken`] with a deadline. Children inherit both:
//! cancelling a parent cancels every child, and a child's deadline is never later
//! than its parent's.
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Why a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Done {
    Cancelled,
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Scope {
    /// Root scope ending after `timeout`.
    pub fn root(timeout: Duration) -> Self {
        Self::with_token(CancellationToken::new(), timeout)
    }

    /// Root scope driven by an existing token (e.g. an interrupt handler).
    pub fn with_token(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            deadline: deadline_after(timeout),
        }
    }

    /// Child scope ending after `timeout`, or when `self` ends, whichever is first.
    pub fn child(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, deadline_after(timeout)) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancel this scope and all of its children. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some` once the scope has ended.
    pub fn err(&self) -> Option<Done> {
        if self.token.is_cancelled() {
            return Some(Done::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Some(Done::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the scope is cancelled or its deadline passes.
    pub async fn done(&self) -> Done {
        match self.deadline {
            Some(at) => tokio::select! {
                _ = self.token.cancelled() => Done::Cancelled,
                _ = sleep_until(at) => Done::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                Done::Cancelled
            }
        }
    }
}

/// `None` when `now + timeout` is not representable, i.e. no deadline.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
