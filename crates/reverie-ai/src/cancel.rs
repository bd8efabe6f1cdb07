//! Racing a future against a caller-supplied [`CancellationToken`].

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{AiError, Result};

/// Run `future` unless `token` is cancelled first.
///
/// A token that is already cancelled wins without polling the future.
pub async fn or_cancel<F>(token: &CancellationToken, future: F) -> Result<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AiError::Cancelled),
        out = future => Ok(out),
    }
}
