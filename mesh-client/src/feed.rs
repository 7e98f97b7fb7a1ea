//! Periodically refreshed views
//!
//! A [`Feed`] owns one background task that re-reads its source on a fixed
//! period and replaces the published value wholesale. A failed read keeps
//! the last good value. Dropping the feed stops the task.

use shared::models::{Category, DatasetListing, PurchaseRequest};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::MarketApi;

pub struct Feed<T> {
    value: watch::Receiver<Option<T>>,
    token: CancellationToken,
}

impl<T> Feed<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start refreshing from `fetch` every `period`, beginning immediately.
    pub fn spawn<F, Fut, E>(period: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, value) = watch::channel(None);
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let result = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    result = fetch() => result,
                };
                match result {
                    Ok(fresh) => {
                        tx.send_replace(Some(fresh));
                    }
                    Err(e) => tracing::warn!(error = %e, "Feed refresh failed, keeping last value"),
                }
            }
            tracing::debug!("Feed stopped");
        });

        Self { value, token }
    }

    /// Latest good value, `None` before the first successful read
    pub fn latest(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.value.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Requests addressed to `uploader_address`, newest first
pub fn requests_feed(
    api: Arc<dyn MarketApi>,
    uploader_address: String,
    period: Duration,
) -> Feed<Vec<PurchaseRequest>> {
    Feed::spawn(period, move || {
        let api = api.clone();
        let uploader = uploader_address.clone();
        async move { api.list_requests(&uploader).await }
    })
}

/// Published listings, optionally restricted to one category
pub fn listings_feed(
    api: Arc<dyn MarketApi>,
    category: Option<Category>,
    period: Duration,
) -> Feed<Vec<DatasetListing>> {
    Feed::spawn(period, move || {
        let api = api.clone();
        async move { api.list_datasets(category).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeMarketApi;
    use shared::request::CreateDataRequest;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_feed(period: Duration, fail_from: u32) -> (Feed<u32>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let feed = Feed::spawn(period, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n >= fail_from {
                    Err("source down")
                } else {
                    Ok(n)
                }
            }
        });
        (feed, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_period() {
        let (feed, calls) = counting_feed(Duration::from_secs(30), u32::MAX);
        let mut rx = feed.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(feed.latest(), Some(1));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(feed.latest(), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_read_keeps_last_value() {
        let (feed, calls) = counting_feed(Duration::from_secs(30), 2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(feed.latest(), Some(1));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(feed.latest(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_refresh() {
        let (feed, calls) = counting_feed(Duration::from_secs(30), u32::MAX);
        tokio::time::sleep(Duration::from_secs(1)).await;
        feed.cancel();
        assert!(feed.is_cancelled());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.latest(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_refresh() {
        let (feed, calls) = counting_feed(Duration::from_secs(30), u32::MAX);
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(feed);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_feed_reads_gateway() {
        let api = Arc::new(FakeMarketApi::new());
        let feed = requests_feed(api.clone(), "0xseller".into(), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(feed.latest(), Some(vec![]));

        api.create_request(&CreateDataRequest {
            dataset_id: "flipkart-1".into(),
            dataset_name: "Flipkart".into(),
            dataset_description: "d".into(),
            cid: "QmF".into(),
            requester_address: "0xbuyer".into(),
            uploader_address: "0xseller".into(),
            category: "Supermart".into(),
            size: "2.5 GB".into(),
            oyd_cost: 2560.into(),
        })
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(feed.latest().map(|r| r.len()), Some(1));
    }
}
