use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jobseek_core::models::{
    CoreError, CoreErrorKind, CoreResult, FETCH_FAILURE_MESSAGE, JobRecord, SearchKey,
    SearchRequest,
};
use jobseek_core::orchestration::{SearchController, SearchOutcome};
use jobseek_core::persistence::{InMemoryKeyValueStore, KeyValueStore, PersistenceResult};
use jobseek_core::service::JobSearchService;
use serde_json::json;

struct StubJobService {
    calls: AtomicUsize,
    requested: Mutex<Vec<SearchKey>>,
    jobs_per_query: usize,
    fail: bool,
    slow_query: Option<(&'static str, Duration)>,
}

impl StubJobService {
    fn returning(jobs_per_query: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            jobs_per_query,
            fail: false,
            slow_query: None,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(0)
        }
    }

    fn slow_for(mut self, query: &'static str, delay: Duration) -> Self {
        self.slow_query = Some((query, delay));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested(&self) -> Vec<SearchKey> {
        self.requested.lock().unwrap().clone()
    }
}

impl JobSearchService for StubJobService {
    fn fetch_jobs(&self, key: &SearchKey) -> CoreResult<Vec<JobRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requested.lock().unwrap().push(key.clone());

        if let Some((query, delay)) = self.slow_query
            && key.query == query
        {
            std::thread::sleep(delay);
        }

        if self.fail {
            return Err(CoreError::new(
                CoreErrorKind::Transport,
                "connection refused",
            ));
        }

        Ok((1..=self.jobs_per_query)
            .map(|index| {
                JobRecord::new(json!({
                    "title": format!("{} #{index}", key.query),
                    "company": "Acme Corp",
                    "link": format!("https://remoteok.com/remote-jobs/{index}"),
                    "source": "Remote OK",
                    "description": format!("call {call}"),
                }))
            })
            .collect())
    }
}

struct ReadOnlyStore {
    write_attempts: AtomicUsize,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> PersistenceResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::new(
            CoreErrorKind::StorageFailure,
            "disk is read-only",
        ))
    }
}

fn at(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000 + seconds)
}

fn request(key: SearchKey, issued_at: SystemTime) -> SearchRequest {
    SearchRequest { key, issued_at }
}

fn controller_with(service: Arc<StubJobService>) -> SearchController {
    SearchController::new(service, Arc::new(InMemoryKeyValueStore::new()))
}

#[tokio::test]
async fn cache_miss_fetches_and_populates_first_page() {
    let service = Arc::new(StubJobService::returning(12));
    let controller = controller_with(service.clone());

    let outcome = controller
        .search(request(SearchKey::query_only("Engineer"), at(0)))
        .await
        .unwrap();

    assert_eq!(outcome, SearchOutcome::Fetched { results: 12 });
    assert_eq!(service.calls(), 1);
    assert_eq!(controller.active_results().unwrap().len(), 12);

    let page = controller.page_snapshot().unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.postings.len(), 9);

    let entries = controller.cached_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].key,
        SearchKey {
            query: "Engineer".to_string(),
            location: String::new(),
            job_type: String::new(),
            experience_level: String::new(),
        }
    );
    assert_eq!(entries[0].timestamp, at(0));
}

#[tokio::test]
async fn identical_search_within_window_skips_the_network() {
    let service = Arc::new(StubJobService::returning(12));
    let controller = controller_with(service.clone());
    let key = SearchKey::query_only("Engineer");

    controller.search(request(key.clone(), at(0))).await.unwrap();
    let first_results = controller.active_results().unwrap();
    controller.go_to_page(2).unwrap();

    let outcome = controller.search(request(key, at(299))).await.unwrap();

    assert_eq!(outcome, SearchOutcome::CacheHit { results: 12 });
    assert_eq!(service.calls(), 1);
    assert_eq!(controller.active_results().unwrap(), first_results);
    assert_eq!(controller.page_snapshot().unwrap().current_page, 1);
}

#[tokio::test]
async fn stale_entry_is_refetched_and_replaced_in_place() {
    let service = Arc::new(StubJobService::returning(12));
    let controller = controller_with(service.clone());
    let key = SearchKey::query_only("Engineer");

    controller.search(request(key.clone(), at(0))).await.unwrap();
    let outcome = controller
        .search(request(key.clone(), at(301)))
        .await
        .unwrap();

    assert_eq!(outcome, SearchOutcome::Fetched { results: 12 });
    assert_eq!(service.calls(), 2);

    let entries = controller.cached_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].timestamp, at(301));
    assert_eq!(entries[0].results[0].as_value()["description"], "call 2");
}

#[tokio::test]
async fn filters_form_distinct_entries_but_one_history_item() {
    let service = Arc::new(StubJobService::returning(3));
    let controller = controller_with(service.clone());

    controller
        .search(request(
            SearchKey::query_only("Engineer").with_location("NY"),
            at(0),
        ))
        .await
        .unwrap();
    controller
        .search(request(SearchKey::query_only("Engineer"), at(10)))
        .await
        .unwrap();

    assert_eq!(service.calls(), 2);
    assert_eq!(controller.cached_entries().unwrap().len(), 2);

    let history = controller.recent_searches().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].key.location, "");
    assert_eq!(history[0].timestamp, at(10));
}

#[tokio::test]
async fn service_receives_normalized_filters() {
    let service = Arc::new(StubJobService::returning(1));
    let controller = controller_with(service.clone());
    let key = SearchKey::new("Engineer", Some("Remote"), None, Some("Entry-level"));

    controller.search(request(key.clone(), at(0))).await.unwrap();

    let requested = service.requested();
    assert_eq!(requested, vec![key.clone()]);
    assert_eq!(
        requested[0].query_params(),
        vec![
            ("q", "Engineer"),
            ("location", "Remote"),
            ("experience_level", "Entry-level"),
        ]
    );
}

#[tokio::test]
async fn failure_clears_results_sets_message_and_leaves_cache_untouched() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let warm = SearchController::new(Arc::new(StubJobService::returning(4)), store.clone());
    warm.search(request(SearchKey::query_only("Designer"), at(0)))
        .await
        .unwrap();

    let writes_before = store.write_count();
    let failing = Arc::new(StubJobService::failing());
    let controller = SearchController::new(failing.clone(), store.clone());
    controller
        .search(request(SearchKey::query_only("Designer"), at(1)))
        .await
        .unwrap();
    assert_eq!(controller.active_results().unwrap().len(), 4);

    let error = controller
        .search(request(SearchKey::query_only("Engineer"), at(2)))
        .await
        .unwrap_err();

    assert_eq!(error.kind, CoreErrorKind::Transport);
    assert_eq!(failing.calls(), 1);
    assert!(controller.active_results().unwrap().is_empty());
    assert_eq!(controller.page_snapshot().unwrap().page_count, 0);

    let view = controller.view_state().unwrap();
    assert!(!view.loading);
    assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILURE_MESSAGE));

    assert_eq!(controller.cached_entries().unwrap().len(), 1);
    assert_eq!(store.write_count(), writes_before);
}

#[tokio::test]
async fn successful_search_clears_a_previous_error() {
    let failing = Arc::new(StubJobService::failing());
    let store = Arc::new(InMemoryKeyValueStore::new());
    let controller = SearchController::new(failing, store.clone());
    let _ = controller
        .search(request(SearchKey::query_only("Engineer"), at(0)))
        .await;
    assert!(controller.view_state().unwrap().error_message.is_some());

    let controller = SearchController::new(Arc::new(StubJobService::returning(0)), store);
    let outcome = controller
        .search(request(SearchKey::query_only("Engineer"), at(1)))
        .await
        .unwrap();

    assert_eq!(outcome, SearchOutcome::Fetched { results: 0 });
    let view = controller.view_state().unwrap();
    assert_eq!(view.error_message, None);
    assert_eq!(view.active_key, Some(SearchKey::query_only("Engineer")));
}

#[tokio::test]
async fn search_again_reuses_the_stored_filters() {
    let service = Arc::new(StubJobService::returning(2));
    let controller = controller_with(service.clone());
    let key = SearchKey::query_only("Engineer")
        .with_job_type("Full-time")
        .with_experience_level("Senior-level");

    controller.search(request(key.clone(), at(0))).await.unwrap();
    let history = controller.recent_searches().unwrap();

    let outcome = controller.search_again(&history[0], at(30)).await.unwrap();
    assert_eq!(outcome, SearchOutcome::CacheHit { results: 2 });

    let outcome = controller.search_again(&history[0], at(600)).await.unwrap();
    assert_eq!(outcome, SearchOutcome::Fetched { results: 2 });
    assert_eq!(service.requested(), vec![key.clone(), key]);
}

#[tokio::test]
async fn history_survives_a_controller_restart() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let first = SearchController::new(Arc::new(StubJobService::returning(5)), store.clone());
    first
        .search(request(SearchKey::query_only("Engineer"), at(0)))
        .await
        .unwrap();

    let service = Arc::new(StubJobService::returning(5));
    let second = SearchController::new(service.clone(), store);
    let outcome = second
        .search(request(SearchKey::query_only("Engineer"), at(60)))
        .await
        .unwrap();

    assert_eq!(outcome, SearchOutcome::CacheHit { results: 5 });
    assert_eq!(service.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newer_search_supersedes_an_in_flight_one() {
    let service = Arc::new(
        StubJobService::returning(3).slow_for("Engineer", Duration::from_millis(300)),
    );
    let controller = Arc::new(controller_with(service.clone()));

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .search(request(SearchKey::query_only("Engineer"), at(0)))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let outcome = controller
        .search(request(SearchKey::query_only("Designer"), at(1)))
        .await
        .unwrap();
    assert_eq!(outcome, SearchOutcome::Fetched { results: 3 });

    let slow_outcome = slow.await.unwrap().unwrap();
    assert_eq!(slow_outcome, SearchOutcome::Superseded);
    assert_eq!(service.calls(), 2);

    let active = controller.active_results().unwrap();
    assert_eq!(active[0].as_value()["title"], "Designer #1");
    assert!(!controller.view_state().unwrap().loading);

    let entries = controller.cached_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key.query, "Designer");
}

#[tokio::test]
async fn failed_history_write_does_not_fail_the_search() {
    let store = Arc::new(ReadOnlyStore {
        write_attempts: AtomicUsize::new(0),
    });
    let service = Arc::new(StubJobService::returning(4));
    let controller = SearchController::new(service.clone(), store.clone());
    let key = SearchKey::query_only("Engineer").with_location("Remote");

    let outcome = controller.search(request(key.clone(), at(0))).await.unwrap();

    assert_eq!(outcome, SearchOutcome::Fetched { results: 4 });
    assert_eq!(store.write_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(controller.active_results().unwrap().len(), 4);
    assert_eq!(controller.view_state().unwrap().error_message, None);

    let entries = controller.cached_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, key);

    let outcome = controller.search(request(key, at(10))).await.unwrap();
    assert_eq!(outcome, SearchOutcome::CacheHit { results: 4 });
    assert_eq!(service.calls(), 1);
}
