use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use crate::cache::{PendingWrite, SearchCache};
use crate::models::{
    CacheEntry, CoreError, CoreErrorKind, FETCH_FAILURE_MESSAGE, JobPosting, JobRecord, SearchKey,
    SearchRequest,
};
use crate::orchestration::{InFlightGuard, OrchestrationResult};
use crate::pager::ResultPager;
use crate::persistence::KeyValueStore;
use crate::service::JobSearchService;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchOutcome {
    CacheHit { results: usize },
    Fetched { results: usize },
    /// A newer search started while this one was waiting on the service;
    /// its response was dropped without touching any state.
    Superseded,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewState {
    pub active_key: Option<SearchKey>,
    pub loading: bool,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageSnapshot {
    pub current_page: i64,
    pub page_count: usize,
    pub page_size: usize,
    pub total_results: usize,
    pub postings: Vec<JobPosting>,
    pub has_previous: bool,
    pub has_next: bool,
}

struct ControllerState {
    cache: SearchCache,
    pager: ResultPager,
    view: ViewState,
}

pub struct SearchController {
    state: Mutex<ControllerState>,
    service: Arc<dyn JobSearchService>,
    guard: InFlightGuard,
    // Generation of the last history snapshot written to the store.
    persisted_generation: Arc<Mutex<u64>>,
}

impl SearchController {
    pub fn new(service: Arc<dyn JobSearchService>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                cache: SearchCache::load(store),
                pager: ResultPager::new(),
                view: ViewState::default(),
            }),
            service,
            guard: InFlightGuard::new(),
            persisted_generation: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn search(&self, request: SearchRequest) -> OrchestrationResult<SearchOutcome> {
        let ticket = self.guard.begin();
        let SearchRequest {
            key,
            issued_at: now,
        } = request;

        {
            let mut state = self.lock_state()?;
            state.view = ViewState {
                active_key: Some(key.clone()),
                loading: true,
                error_message: None,
            };
            state.pager.clear();

            let cached = state
                .cache
                .fresh_lookup(&key, now)
                .map(|entry| entry.results.clone());
            if let Some(results) = cached {
                let count = results.len();
                state.pager.set_results(results);
                state.view.loading = false;
                tracing::debug!(
                    generation = ticket.generation(),
                    query = %key.query,
                    results = count,
                    "serving search from fresh cache entry"
                );
                return Ok(SearchOutcome::CacheHit { results: count });
            }
        }

        tracing::debug!(
            generation = ticket.generation(),
            query = %key.query,
            "no fresh cache entry; calling job search service"
        );
        let fetched = self.fetch(key.clone()).await;

        let (count, write) = {
            let mut state = self.lock_state()?;
            if ticket.is_superseded() {
                tracing::debug!(
                    generation = ticket.generation(),
                    query = %key.query,
                    "discarding response of superseded search"
                );
                return Ok(SearchOutcome::Superseded);
            }

            state.view.loading = false;
            match fetched {
                Ok(jobs) => {
                    let count = jobs.len();
                    state.pager.set_results(jobs.clone());
                    (count, state.cache.upsert_deferred(key.clone(), jobs, now))
                }
                Err(error) => {
                    state.view.error_message = Some(FETCH_FAILURE_MESSAGE.to_string());
                    tracing::error!(
                        query = %key.query,
                        kind = ?error.kind,
                        message = %error.message,
                        "job search request failed"
                    );
                    return Err(error);
                }
            }
        };

        if let Err(error) = self.persist(ticket.generation(), write).await {
            tracing::error!(
                query = %key.query,
                kind = ?error.kind,
                message = %error.message,
                "failed to persist recent searches"
            );
        }
        Ok(SearchOutcome::Fetched { results: count })
    }

    /// Re-issues a history item with exactly its stored filters.
    pub async fn search_again(
        &self,
        entry: &CacheEntry,
        issued_at: SystemTime,
    ) -> OrchestrationResult<SearchOutcome> {
        self.search(SearchRequest {
            key: entry.key.clone(),
            issued_at,
        })
        .await
    }

    pub fn go_to_page(&self, page: i64) -> OrchestrationResult<()> {
        self.lock_state()?.pager.go_to_page(page);
        Ok(())
    }

    pub fn page_snapshot(&self) -> OrchestrationResult<PageSnapshot> {
        let state = self.lock_state()?;
        let pager = &state.pager;
        Ok(PageSnapshot {
            current_page: pager.current_page(),
            page_count: pager.page_count(),
            page_size: pager.page_size(),
            total_results: pager.total_results(),
            postings: pager.renderable_slice(),
            has_previous: pager.has_previous(),
            has_next: pager.has_next(),
        })
    }

    pub fn active_results(&self) -> OrchestrationResult<Vec<JobRecord>> {
        Ok(self.lock_state()?.pager.active_results().to_vec())
    }

    pub fn view_state(&self) -> OrchestrationResult<ViewState> {
        Ok(self.lock_state()?.view.clone())
    }

    pub fn cached_entries(&self) -> OrchestrationResult<Vec<CacheEntry>> {
        Ok(self.lock_state()?.cache.entries().to_vec())
    }

    pub fn recent_searches(&self) -> OrchestrationResult<Vec<CacheEntry>> {
        Ok(self.lock_state()?.cache.distinct_by_query_newest_first())
    }

    async fn fetch(&self, key: SearchKey) -> OrchestrationResult<Vec<JobRecord>> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || service.fetch_jobs(&key))
            .await
            .map_err(|join_error| CoreError {
                kind: CoreErrorKind::Internal,
                message: format!("job search join failure: {join_error}"),
            })?
    }

    /// Writes run on the blocking pool. A snapshot older than one already
    /// written is skipped so the slot never moves backwards.
    async fn persist(&self, generation: u64, write: PendingWrite) -> OrchestrationResult<()> {
        let persisted_generation = self.persisted_generation.clone();
        tokio::task::spawn_blocking(move || {
            let mut last = persisted_generation.lock().map_err(|_| CoreError {
                kind: CoreErrorKind::Internal,
                message: "history write mutex poisoned".to_string(),
            })?;
            if generation < *last {
                return Ok(());
            }
            write.commit()?;
            *last = generation;
            Ok(())
        })
        .await
        .map_err(|join_error| CoreError {
            kind: CoreErrorKind::Internal,
            message: format!("history write join failure: {join_error}"),
        })?
    }

    fn lock_state(&self) -> OrchestrationResult<MutexGuard<'_, ControllerState>> {
        self.state.lock().map_err(|_| CoreError {
            kind: CoreErrorKind::Internal,
            message: "search controller mutex poisoned".to_string(),
        })
    }
}
