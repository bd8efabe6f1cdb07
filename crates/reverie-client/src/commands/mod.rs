//! Command functions the host UI calls.
//!
//! Each sub-module groups related commands by domain.  Every command takes
//! the shared [`AppState`](crate::state::AppState) by reference; network
//! commands also take a cancellation token and are bounded by
//! `config.request_timeout`.

pub mod content;
pub mod dreams;
pub mod streak;

use std::future::Future;
use std::time::Duration;

use reverie_ai::AiError;

use crate::error::{ClientError, Result};

pub(crate) async fn with_timeout<T, F>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, AiError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!(timeout_secs = limit.as_secs(), "network command timed out");
            Err(ClientError::Timeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn elapsed_maps_to_timeout() {
        let limit = Duration::from_millis(20);
        let err = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AiError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(d) if d == limit));
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let err = with_timeout(Duration::from_secs(1), async {
            Err::<(), _>(AiError::EmptyResponse)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Ai(AiError::EmptyResponse)));
    }
}
