//! Completion handle for background commands

use crate::error::{Result, StarterError};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// One-shot completion signal of a background command
///
/// Awaiting the handle yields the command's result. Cancelling kills the
/// child if it is still running and resolves the handle with
/// [`StarterError::Cancelled`].
#[derive(Debug)]
pub struct CommandHandle {
    result: oneshot::Receiver<Result<()>>,
    cancel: CancellationToken,
}

impl CommandHandle {
    pub(crate) fn new(result: oneshot::Receiver<Result<()>>, cancel: CancellationToken) -> Self {
        Self { result, cancel }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this command, e.g. to tie it to a deadline
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Future for CommandHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the worker never got to report
        Pin::new(&mut self.result)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(StarterError::Cancelled)))
    }
}
