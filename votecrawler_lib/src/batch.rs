//! Concurrent fetch-and-extract over a whole URL list.
//!
//! Every URL gets its own task in a `JoinSet`; all tasks start at once
//! unless a concurrency limit is configured, in which case a `Semaphore`
//! bounds the number of requests in flight. Each task reports its input
//! index together with its outcome, so the result is index-aligned with the
//! input no matter in which order the fetches finish.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use votecrawler_http::Client;

use crate::extract::{ExtractError, PartyTallies, TableExtractor};

/// Why a single page produced no tallies.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] votecrawler_http::Error),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("task failed: {0}")]
    TaskFailed(String),
}

/// Terminal state of one URL's unit of work.
#[derive(Debug)]
pub struct PageOutcome {
    pub url: String,
    pub result: Result<PartyTallies, PageError>,
}

impl PageOutcome {
    /// Tallies of a successful, non-empty extraction.
    pub fn tallies(&self) -> Option<&PartyTallies> {
        self.result.as_ref().ok().filter(|t| !t.is_empty())
    }

    pub fn is_usable(&self) -> bool {
        self.tallies().is_some()
    }
}

/// Fans a URL list out over the shared client and joins on every outcome.
pub struct BatchCoordinator {
    client: Client,
    extractor: Arc<TableExtractor>,
    concurrency: Option<usize>,
}

impl BatchCoordinator {
    pub fn new(client: Client, extractor: TableExtractor) -> Self {
        Self {
            client,
            extractor: Arc::new(extractor),
            concurrency: None,
        }
    }

    /// Caps the number of fetches in flight. A limit of 0 is treated as 1.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }

    pub fn concurrency_limit(&self) -> Option<usize> {
        self.concurrency
    }

    pub fn extractor(&self) -> &TableExtractor {
        &self.extractor
    }

    /// Fetches and extracts every URL; outcome `i` belongs to `urls[i]`.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S]) -> Vec<PageOutcome> {
        self.run_with_progress(urls, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_complete` as each unit finishes
    /// (in completion order).
    pub async fn run_with_progress<S, F>(&self, urls: &[S], mut on_complete: F) -> Vec<PageOutcome>
    where
        S: AsRef<str>,
        F: FnMut(&PageOutcome),
    {
        let semaphore = self.concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut join_set = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let url = url.as_ref().to_string();
            let client = self.client.clone();
            let extractor = Arc::clone(&self.extractor);
            let semaphore = semaphore.clone();

            join_set.spawn(async move {
                let _permit = match semaphore {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let result = fetch_and_extract(&client, &extractor, &url).await;
                (index, PageOutcome { url, result })
            });
        }
        tracing::debug!("Spawned {} fetch tasks", urls.len());

        let mut slots: Vec<Option<PageOutcome>> = urls.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Err(e) = &outcome.result {
                        tracing::debug!("{}: {}", outcome.url, e);
                    }
                    on_complete(&outcome);
                    slots[index] = Some(outcome);
                }
                Err(e) => tracing::error!("Fetch task did not complete: {}", e),
            }
        }

        fill_slots(slots, urls, on_complete)
    }
}

/// Unwraps index-aligned slots. A slot whose task never reported becomes a
/// `TaskFailed` outcome for that URL and is passed to `on_complete`.
fn fill_slots<S, F>(
    slots: Vec<Option<PageOutcome>>,
    urls: &[S],
    mut on_complete: F,
) -> Vec<PageOutcome>
where
    S: AsRef<str>,
    F: FnMut(&PageOutcome),
{
    slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| match slot {
            Some(outcome) => outcome,
            None => {
                let outcome = PageOutcome {
                    url: url.as_ref().to_string(),
                    result: Err(PageError::TaskFailed("task panicked before reporting".into())),
                };
                on_complete(&outcome);
                outcome
            }
        })
        .collect()
}

async fn fetch_and_extract(
    client: &Client,
    extractor: &TableExtractor,
    url: &str,
) -> Result<PartyTallies, PageError> {
    let html = client.fetch_page(url).await?;
    let tallies = extractor.try_extract(&html)?;
    tracing::debug!(
        "{}: {} of {} parties found",
        url,
        tallies.found_count(),
        tallies.len()
    );
    Ok(tallies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_not_usable() {
        let outcome = PageOutcome {
            url: "http://x.example/a?detailonr=1".into(),
            result: Err(PageError::Fetch(votecrawler_http::Error::HttpStatus {
                status: 503,
                body: String::new(),
            })),
        };
        assert!(!outcome.is_usable());
        assert!(outcome.tallies().is_none());
    }

    #[test]
    fn test_empty_tallies_not_usable() {
        let outcome = PageOutcome {
            url: "http://x.example/a?detailonr=1".into(),
            result: Ok(PartyTallies::default()),
        };
        assert!(!outcome.is_usable());
    }

    #[test]
    fn test_missing_slot_becomes_task_failed() {
        let urls = [
            "http://x.example/a?detailonr=1",
            "http://x.example/b?detailonr=2",
            "http://x.example/c?detailonr=3",
        ];
        let slots = vec![
            Some(PageOutcome {
                url: urls[0].into(),
                result: Ok(PartyTallies::default()),
            }),
            None,
            Some(PageOutcome {
                url: urls[2].into(),
                result: Ok(PartyTallies::default()),
            }),
        ];

        let mut reported = Vec::new();
        let outcomes = fill_slots(slots, &urls, |o| reported.push(o.url.clone()));

        let order: Vec<&str> = outcomes.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(order, urls);
        assert!(matches!(outcomes[1].result, Err(PageError::TaskFailed(_))));
        assert!(outcomes[0].result.is_ok());
        assert_eq!(reported, vec![urls[1].to_string()]);
    }

    #[test]
    fn test_zero_limit_becomes_one() {
        let catalog = Arc::new(crate::PartyCatalog::builtin().unwrap());
        let coordinator = BatchCoordinator::new(Client::new().unwrap(), TableExtractor::new(catalog))
            .with_concurrency_limit(0);
        assert_eq!(coordinator.concurrency_limit(), Some(1));
    }
}
