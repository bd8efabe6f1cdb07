use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use reverie_shared::{ContentType, DailyContent};

use super::with_timeout;
use crate::error::Result;
use crate::state::AppState;

/// Today's content of `content_type`, from the cache when it is fresh.
pub async fn daily_content(
    state: &AppState,
    content_type: ContentType,
    cancel: &CancellationToken,
) -> Result<DailyContent> {
    if let Some(cached) = state.content_cache.get(content_type)? {
        debug!(%content_type, "daily content served from cache");
        return Ok(cached);
    }
    refresh_daily_content(state, content_type, cancel).await
}

/// Fetch new content even if today's is cached, replacing the cached copy.
pub async fn refresh_daily_content(
    state: &AppState,
    content_type: ContentType,
    cancel: &CancellationToken,
) -> Result<DailyContent> {
    let content = with_timeout(
        state.config.request_timeout,
        state
            .content
            .fetch_content(content_type, state.config.content_mode, cancel),
    )
    .await?;

    state.content_cache.put(content_type, &content)?;
    Ok(content)
}

/// Warm every cache slot concurrently.  Returns the types that failed.
pub async fn prefetch_daily_content(
    state: &AppState,
    cancel: &CancellationToken,
) -> Vec<ContentType> {
    let results = join_all(
        ContentType::ALL
            .into_iter()
            .map(|ty| async move { (ty, daily_content(state, ty, cancel).await) }),
    )
    .await;

    results
        .into_iter()
        .filter_map(|(ty, result)| match result {
            Ok(_) => None,
            Err(e) => {
                warn!(content_type = %ty, error = %e, "prefetch failed");
                Some(ty)
            }
        })
        .collect()
}
