//! Bounded store calls
//!
//! The store is synchronous (SQLite behind a mutex), so calls run on the
//! blocking pool and are abandoned after `timeout`. An abandoned call keeps
//! running to completion in the background.

use std::sync::Arc;
use std::time::Duration;
use streak_store::{DayStatusStore, StoreError, StoreResult};

pub(crate) async fn call_store<T, F>(
    store: &Arc<dyn DayStatusStore>,
    timeout: Duration,
    op: &'static str,
    f: F,
) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn DayStatusStore) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || f(store.as_ref()));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(StoreError::Unavailable(format!(
            "{} aborted: {}",
            op, join_err
        ))),
        Err(_) => Err(StoreError::Unavailable(format!(
            "{} timed out after {}ms",
            op,
            timeout.as_millis()
        ))),
    }
}
