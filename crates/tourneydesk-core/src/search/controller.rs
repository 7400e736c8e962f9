use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::engine::{SearchIndex, SearchOptions, SearchResult, SearchResultType};
use super::state::{SearchBox, SearchKey, SearchRequest, SearchState};
use crate::api::{ApiClient, ApiResult};
use crate::models::{Championship, Match, Participant, Team};
use crate::repository::{Backend, EntityTransport, RemoteBackend};

/// Something that can answer a search query.
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    async fn search(
        &self,
        query: &str,
        allowed: &[SearchResultType],
        options: &SearchOptions,
    ) -> ApiResult<Vec<SearchResult>>;
}

#[async_trait]
impl SearchSource for SearchIndex {
    async fn search(
        &self,
        query: &str,
        allowed: &[SearchResultType],
        options: &SearchOptions,
    ) -> ApiResult<Vec<SearchResult>> {
        Ok(SearchIndex::search(self, query, allowed, options))
    }
}

/// Searches the collections served by the backend, loading only the
/// collections the allowed types need. Lists go through the query cache.
pub struct RemoteSearchSource<C = ApiClient> {
    backend: RemoteBackend<C>,
}

impl<C: EntityTransport> RemoteSearchSource<C> {
    pub fn new(backend: RemoteBackend<C>) -> Self {
        Self { backend }
    }

    pub async fn load_index(&self, allowed: &[SearchResultType]) -> ApiResult<SearchIndex> {
        let wants = |kinds: &[SearchResultType]| allowed.iter().any(|t| kinds.contains(t));
        let people = [SearchResultType::Player, SearchResultType::Coach];

        let (championships, teams, participants, matches) = futures::try_join!(
            self.list_if::<Championship>(wants(&[SearchResultType::Championship])),
            self.list_if::<Team>(wants(&[
                SearchResultType::Team,
                SearchResultType::Player,
                SearchResultType::Coach,
                SearchResultType::Match,
            ])),
            self.list_if::<Participant>(wants(&people)),
            self.list_if::<Match>(wants(&[SearchResultType::Match])),
        )?;

        Ok(SearchIndex::new(championships, teams, participants, matches))
    }

    async fn list_if<T>(&self, needed: bool) -> ApiResult<Vec<T>>
    where
        T: crate::models::Entity,
        RemoteBackend<C>: Backend<T>,
    {
        if needed {
            Backend::<T>::list(&self.backend).await
        } else {
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl<C: EntityTransport + 'static> SearchSource for RemoteSearchSource<C> {
    async fn search(
        &self,
        query: &str,
        allowed: &[SearchResultType],
        options: &SearchOptions,
    ) -> ApiResult<Vec<SearchResult>> {
        let index = self.load_index(allowed).await?;
        Ok(index.search(query, allowed, options))
    }
}

struct Completion {
    seq: u64,
    outcome: ApiResult<Vec<SearchResult>>,
}

/// Drives a [`SearchBox`]: debounces input, runs searches on the runtime and
/// applies only the newest completion.
pub struct UniversalSearch<S> {
    search_box: SearchBox,
    allowed: Vec<SearchResultType>,
    source: Arc<S>,
    debouncer: Debouncer<String>,
    fired: mpsc::UnboundedReceiver<String>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: SearchSource> UniversalSearch<S> {
    pub fn new(source: Arc<S>, allowed: Vec<SearchResultType>, options: SearchOptions) -> Self {
        let (debouncer, fired) = Debouncer::new(options.debounce);
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let allowed = if allowed.is_empty() {
            SearchResultType::ALL.to_vec()
        } else {
            allowed
        };
        Self {
            search_box: SearchBox::new(options),
            allowed,
            source,
            debouncer,
            fired,
            done_tx,
            done_rx,
        }
    }

    pub fn search_box(&self) -> &SearchBox {
        &self.search_box
    }

    pub fn state(&self) -> SearchState {
        self.search_box.state()
    }

    pub fn input(&mut self, query: &str) {
        if self.search_box.input(query) {
            self.debouncer.push(query.to_string());
        } else {
            self.debouncer.cancel();
        }
    }

    pub fn key(&mut self, key: SearchKey) -> Option<SearchResult> {
        if key == SearchKey::Escape {
            self.debouncer.cancel();
        }
        self.search_box.key(key)
    }

    pub fn click_outside(&mut self) {
        self.debouncer.cancel();
        self.search_box.click_outside();
    }

    /// Wait until the box changes state: a search starts or results land.
    pub async fn next_update(&mut self) -> SearchState {
        loop {
            tokio::select! {
                Some(query) = self.fired.recv() => {
                    if let Some(request) = self.search_box.begin(&query) {
                        self.spawn_search(request);
                        return self.search_box.state();
                    }
                }
                Some(done) = self.done_rx.recv() => {
                    let applied = match done.outcome {
                        Ok(results) => self.search_box.complete(done.seq, results),
                        Err(e) => {
                            warn!(seq = done.seq, error = %e, "Search failed");
                            self.search_box.fail(done.seq)
                        }
                    };
                    if applied {
                        return self.search_box.state();
                    }
                    debug!(seq = done.seq, "Discarding stale search results");
                }
                else => return self.search_box.state(),
            }
        }
    }

    fn spawn_search(&self, request: SearchRequest) {
        let source = Arc::clone(&self.source);
        let allowed = self.allowed.clone();
        let options = *self.search_box.options();
        let tx = self.done_tx.clone();
        debug!(seq = request.seq, query = %request.query, "Searching");
        tokio::spawn(async move {
            let outcome = source.search(&request.query, &allowed, &options).await;
            let _ = tx.send(Completion {
                seq: request.seq,
                outcome,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::cache::QueryCache;
    use crate::repository::backend::tests::FakeTransport;
    use crate::search::engine::tests::index;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers with one result named after the query, after a per-query delay.
    #[derive(Default)]
    struct SlowSource {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchSource for SlowSource {
        async fn search(
            &self,
            query: &str,
            _allowed: &[SearchResultType],
            _options: &SearchOptions,
        ) -> ApiResult<Vec<SearchResult>> {
            self.queries.lock().unwrap().push(query.to_string());
            let delay = if query.len() == 1 { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if query == "fail" {
                return Err(ApiError::ServerError("boom".to_string()));
            }
            Ok(vec![SearchResult {
                id: query.to_string(),
                name: query.to_string(),
                result_type: SearchResultType::Team,
                subtitle: None,
                metadata: None,
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_runs_one_search() {
        let source = Arc::new(SlowSource::default());
        let mut search = UniversalSearch::new(source.clone(), Vec::new(), SearchOptions::default());

        search.input("k");
        tokio::time::advance(Duration::from_millis(50)).await;
        search.input("ka");
        tokio::time::advance(Duration::from_millis(50)).await;
        search.input("kaa");

        assert_eq!(search.next_update().await, SearchState::Loading);
        assert_eq!(search.next_update().await, SearchState::Results);
        assert_eq!(*source.queries.lock().unwrap(), vec!["kaa".to_string()]);
        assert_eq!(search.search_box().results()[0].id, "kaa");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_search_is_discarded() {
        let source = Arc::new(SlowSource::default());
        let mut search = UniversalSearch::new(source.clone(), Vec::new(), SearchOptions::default());

        search.input("a");
        assert_eq!(search.next_update().await, SearchState::Loading);
        search.input("ab");
        assert_eq!(search.next_update().await, SearchState::Loading);
        assert_eq!(search.next_update().await, SearchState::Results);

        let late = tokio::time::timeout(Duration::from_secs(2), search.next_update()).await;
        assert!(late.is_err());
        assert_eq!(search.search_box().results().len(), 1);
        assert_eq!(search.search_box().results()[0].id, "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_shows_empty() {
        let mut search =
            UniversalSearch::new(Arc::new(SlowSource::default()), Vec::new(), SearchOptions::default());
        search.input("fail");
        search.next_update().await;
        assert_eq!(search.next_update().await, SearchState::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_query_cancels_pending_search() {
        let source = Arc::new(SlowSource::default());
        let mut search = UniversalSearch::new(source.clone(), Vec::new(), SearchOptions::default());

        search.input("ka");
        search.input("");
        assert_eq!(search.state(), SearchState::Closed);

        let update = tokio::time::timeout(Duration::from_secs(1), search.next_update()).await;
        assert!(update.is_err());
        assert!(source.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_index_source_and_enter() {
        let mut search = UniversalSearch::new(
            Arc::new(index()),
            vec![SearchResultType::Team],
            SearchOptions::default(),
        );
        search.input("owl");
        search.next_update().await;
        assert_eq!(search.next_update().await, SearchState::Results);

        search.key(SearchKey::Down);
        let chosen = search.key(SearchKey::Enter).unwrap();
        assert_eq!(chosen.id, "t2");
        assert_eq!(search.state(), SearchState::Closed);
    }

    #[tokio::test]
    async fn test_remote_source_loads_only_needed_collections() {
        let transport = FakeTransport::default();
        transport.records.lock().unwrap().insert(
            "t1".to_string(),
            serde_json::json!({ "id": "t1", "name": "Kaama Esports" }),
        );
        let source = RemoteSearchSource::new(RemoteBackend::new(transport, QueryCache::default()));

        let results = source
            .search("kaama", &[SearchResultType::Team], &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result_type, SearchResultType::Team);
        assert_eq!(source.backend.transport().list_calls.load(Ordering::SeqCst), 1);
    }
}
