//! Small cancellation helpers shared by the select widget's timers and
//! network fetches.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Returned when a future was abandoned because its token fired first.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelErr {
    Cancelled,
}

#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// Race `self` against `token`. The wrapped future is dropped as soon as
    /// the token is cancelled.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CancelErr::Cancelled),
            res = self => Ok(res),
        }
    }
}

/// Sleep for `duration` unless `token` fires first.
pub async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> Result<(), CancelErr> {
    if token.is_cancelled() {
        return Err(CancelErr::Cancelled);
    }
    if duration.is_zero() {
        return Ok(());
    }
    tokio::time::sleep(duration).or_cancel(token).await
}
