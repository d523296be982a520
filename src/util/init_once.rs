use once_cell::sync::OnceCell;
use std::future::Future;
use tokio::sync::Mutex;

/// A value created by an async constructor the first time it is needed.
///
/// Concurrent callers wait for the first creation instead of racing; a failed
/// creation leaves the cell empty so the next caller tries again.
pub(crate) struct InitOnce<T> {
    initializing: Mutex<()>,
    value: OnceCell<T>,
}

impl<T> InitOnce<T> {
    pub(crate) fn new() -> Self {
        InitOnce {
            initializing: Mutex::new(()),
            value: OnceCell::new(),
        }
    }

    pub(crate) async fn get_or_try_init<F, Fut, E>(&self, create: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let _initializing = self.initializing.lock().await;
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let value = create().await?;
        Ok(self.value.get_or_init(|| value))
    }
}

#[cfg(test)]
mod tests {
    use super::InitOnce;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_creates_once() {
        let cell = InitOnce::new();
        let created = AtomicUsize::new(0);
        let counter = &created;
        let create = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<_, ()>(7)
        };

        let (a, b) = futures::future::join(
            cell.get_or_try_init(create),
            cell.get_or_try_init(create),
        )
        .await;
        assert_eq!(Ok(&7), a);
        assert_eq!(Ok(&7), b);
        assert_eq!(1, created.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_retries_after_failure() {
        let cell = InitOnce::new();
        assert_eq!(
            Err("unavailable"),
            cell.get_or_try_init(|| async { Err("unavailable") }).await
        );
        assert_eq!(
            Ok(&"ready"),
            cell.get_or_try_init(|| async { Ok::<_, &str>("ready") }).await
        );
    }
}
