use super::engine::{SearchOptions, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Closed,
    Loading,
    Results,
    Empty,
}

impl SearchState {
    pub fn is_open(self) -> bool {
        self != SearchState::Closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// A search ready to be issued. `seq` identifies it when the result comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// Search box state: query text, dropdown state, results and keyboard selection.
///
/// Transitions are driven by the query length, the debounce timer firing
/// (`begin`) and search completion (`complete`). Only the completion of the
/// most recently issued request is applied.
#[derive(Debug, Clone)]
pub struct SearchBox {
    options: SearchOptions,
    query: String,
    state: SearchState,
    results: Vec<SearchResult>,
    selected: Option<usize>,
    last_issued: u64,
}

impl SearchBox {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            query: String::new(),
            state: SearchState::Closed,
            results: Vec::new(),
            selected: None,
            last_issued: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Update the query text. Returns true if a debounced search should be
    /// scheduled; a query below the threshold closes the box instead.
    pub fn input(&mut self, query: impl Into<String>) -> bool {
        self.query = query.into();
        if self.options.accepts(&self.query) {
            true
        } else {
            self.close();
            self.results.clear();
            false
        }
    }

    /// Debounce timer fired for `query`. Issues a request unless the text has
    /// since changed or dropped below the threshold.
    pub fn begin(&mut self, query: &str) -> Option<SearchRequest> {
        if query != self.query || !self.options.accepts(query) {
            return None;
        }
        self.last_issued += 1;
        self.state = SearchState::Loading;
        Some(SearchRequest {
            seq: self.last_issued,
            query: self.query.clone(),
        })
    }

    /// Apply results for request `seq`. Returns false when the completion is
    /// stale or the box was closed meanwhile.
    pub fn complete(&mut self, seq: u64, mut results: Vec<SearchResult>) -> bool {
        if seq != self.last_issued || self.state != SearchState::Loading {
            return false;
        }
        results.truncate(self.options.max_results);
        self.state = if results.is_empty() {
            SearchState::Empty
        } else {
            SearchState::Results
        };
        self.results = results;
        self.selected = None;
        true
    }

    /// A failed search shows as empty.
    pub fn fail(&mut self, seq: u64) -> bool {
        self.complete(seq, Vec::new())
    }

    /// Handle a navigation key. Enter returns the selected result and closes.
    pub fn key(&mut self, key: SearchKey) -> Option<SearchResult> {
        match key {
            SearchKey::Up => {
                if self.state == SearchState::Results {
                    self.selected = Some(self.selected.map(|i| i.saturating_sub(1)).unwrap_or(0));
                }
                None
            }
            SearchKey::Down => {
                if self.state == SearchState::Results {
                    let last = self.results.len().saturating_sub(1);
                    self.selected = Some(self.selected.map(|i| (i + 1).min(last)).unwrap_or(0));
                }
                None
            }
            SearchKey::Enter => {
                let chosen = self.selected_result().cloned();
                if chosen.is_some() {
                    self.close();
                }
                chosen
            }
            SearchKey::Escape => {
                self.close();
                None
            }
        }
    }

    pub fn click_outside(&mut self) {
        self.close();
    }

    pub fn close(&mut self) {
        self.state = SearchState::Closed;
        self.selected = None;
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::SearchResultType;

    fn result(id: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            name: format!("Team {}", id),
            result_type: SearchResultType::Team,
            subtitle: None,
            metadata: None,
        }
    }

    fn loaded(ids: &[&str]) -> SearchBox {
        let mut sb = SearchBox::default();
        assert!(sb.input("te"));
        let req = sb.begin("te").unwrap();
        assert!(sb.complete(req.seq, ids.iter().map(|id| result(id)).collect()));
        sb
    }

    #[test]
    fn test_empty_query_closes() {
        let mut sb = loaded(&["1"]);
        assert!(!sb.input(""));
        assert_eq!(sb.state(), SearchState::Closed);
        assert!(sb.results().is_empty());
    }

    #[test]
    fn test_threshold_controls_requests() {
        let mut sb = SearchBox::new(SearchOptions {
            min_query_length: 3,
            ..Default::default()
        });
        assert!(!sb.input("ab"));
        assert!(sb.begin("ab").is_none());
        assert!(sb.input("abc"));
        assert_eq!(sb.state(), SearchState::Closed);
        let req = sb.begin("abc").unwrap();
        assert_eq!(sb.state(), SearchState::Loading);
        assert_eq!(req.query, "abc");
    }

    #[test]
    fn test_completion_sets_results_or_empty() {
        let sb = loaded(&["1", "2"]);
        assert_eq!(sb.state(), SearchState::Results);
        assert_eq!(sb.results().len(), 2);

        let sb = loaded(&[]);
        assert_eq!(sb.state(), SearchState::Empty);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut sb = SearchBox::default();
        sb.input("a");
        let first = sb.begin("a").unwrap();
        sb.input("ab");
        let second = sb.begin("ab").unwrap();

        assert!(sb.complete(second.seq, vec![result("ab")]));
        assert!(!sb.complete(first.seq, vec![result("a"), result("b")]));
        assert_eq!(sb.results().len(), 1);
        assert_eq!(sb.results()[0].id, "ab");
    }

    #[test]
    fn test_outdated_timer_does_not_issue() {
        let mut sb = SearchBox::default();
        sb.input("a");
        sb.input("ab");
        assert!(sb.begin("a").is_none());
        assert!(sb.begin("ab").is_some());
    }

    #[test]
    fn test_completion_after_close_is_ignored() {
        let mut sb = SearchBox::default();
        sb.input("x");
        let req = sb.begin("x").unwrap();
        sb.key(SearchKey::Escape);
        assert!(!sb.complete(req.seq, vec![result("1")]));
        assert_eq!(sb.state(), SearchState::Closed);
    }

    #[test]
    fn test_results_are_capped() {
        let mut sb = SearchBox::new(SearchOptions {
            max_results: 2,
            ..Default::default()
        });
        sb.input("t");
        let req = sb.begin("t").unwrap();
        sb.complete(req.seq, vec![result("1"), result("2"), result("3")]);
        assert_eq!(sb.results().len(), 2);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut sb = loaded(&["1", "2", "3"]);
        assert_eq!(sb.selected(), None);

        sb.key(SearchKey::Up);
        assert_eq!(sb.selected(), Some(0));
        for _ in 0..5 {
            sb.key(SearchKey::Down);
        }
        assert_eq!(sb.selected(), Some(2));
        sb.key(SearchKey::Up);
        assert_eq!(sb.selected(), Some(1));
    }

    #[test]
    fn test_enter_returns_selection_and_closes() {
        let mut sb = loaded(&["1", "2"]);
        assert_eq!(sb.key(SearchKey::Enter), None);
        assert_eq!(sb.state(), SearchState::Results);

        sb.key(SearchKey::Down);
        sb.key(SearchKey::Down);
        let chosen = sb.key(SearchKey::Enter).unwrap();
        assert_eq!(chosen.id, "2");
        assert_eq!(sb.state(), SearchState::Closed);
        assert_eq!(sb.selected(), None);
    }

    #[test]
    fn test_escape_and_click_outside_close() {
        let mut sb = loaded(&["1"]);
        sb.key(SearchKey::Escape);
        assert!(!sb.state().is_open());

        let mut sb = loaded(&["1"]);
        sb.click_outside();
        assert_eq!(sb.state(), SearchState::Closed);
    }

    #[test]
    fn test_navigation_ignored_when_empty() {
        let mut sb = loaded(&[]);
        sb.key(SearchKey::Down);
        assert_eq!(sb.selected(), None);
    }
}
