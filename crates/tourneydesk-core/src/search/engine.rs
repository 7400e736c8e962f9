use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Championship, Match, Participant, Team, TeamId};
use crate::utils::{contains_ignore_case, format_date};

const DEFAULT_MAX_RESULTS: usize = 8;
const DEFAULT_MIN_QUERY_LENGTH: usize = 1;
const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultType {
    Championship,
    Team,
    Player,
    Coach,
    Match,
}

impl SearchResultType {
    pub const ALL: [SearchResultType; 5] = [
        SearchResultType::Championship,
        SearchResultType::Team,
        SearchResultType::Player,
        SearchResultType::Coach,
        SearchResultType::Match,
    ];
}

impl fmt::Display for SearchResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchResultType::Championship => "championship",
            SearchResultType::Team => "team",
            SearchResultType::Player => "player",
            SearchResultType::Coach => "coach",
            SearchResultType::Match => "match",
        };
        f.write_str(label)
    }
}

impl FromStr for SearchResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "championship" | "championships" => Ok(SearchResultType::Championship),
            "team" | "teams" => Ok(SearchResultType::Team),
            "player" | "players" => Ok(SearchResultType::Player),
            "coach" | "coaches" => Ok(SearchResultType::Coach),
            "match" | "matches" => Ok(SearchResultType::Match),
            other => Err(format!("unknown search type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub result_type: SearchResultType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl SearchResult {
    /// Query must already be lowercased
    fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query)
            || self
                .subtitle
                .as_ref()
                .map(|s| contains_ignore_case(s, query))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub min_query_length: usize,
    pub debounce: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl SearchOptions {
    /// Whether `query` is long enough to search for
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_length
    }
}

/// Snapshot of the searchable collections.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    pub championships: Vec<Championship>,
    pub teams: Vec<Team>,
    pub participants: Vec<Participant>,
    pub matches: Vec<Match>,
}

impl SearchIndex {
    pub fn new(
        championships: Vec<Championship>,
        teams: Vec<Team>,
        participants: Vec<Participant>,
        matches: Vec<Match>,
    ) -> Self {
        Self {
            championships,
            teams,
            participants,
            matches,
        }
    }

    /// Case-insensitive search over the collections named in `allowed`,
    /// merged in the order of `allowed` and capped at `max_results`.
    pub fn search(
        &self,
        query: &str,
        allowed: &[SearchResultType],
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        if !options.accepts(query) {
            return Vec::new();
        }
        let needle = query.trim().to_lowercase();

        let mut seen_types = Vec::new();
        let mut results = Vec::new();
        for &kind in allowed {
            if seen_types.contains(&kind) {
                continue;
            }
            seen_types.push(kind);

            results.extend(
                self.candidates(kind)
                    .into_iter()
                    .filter(|r| r.matches(&needle)),
            );
            if results.len() >= options.max_results {
                break;
            }
        }
        results.truncate(options.max_results);
        results
    }

    fn candidates(&self, kind: SearchResultType) -> Vec<SearchResult> {
        match kind {
            SearchResultType::Championship => {
                self.championships.iter().map(championship_result).collect()
            }
            SearchResultType::Team => self.teams.iter().map(team_result).collect(),
            SearchResultType::Player => self
                .participants
                .iter()
                .filter(|p| !p.is_coach)
                .map(|p| self.participant_result(p))
                .collect(),
            SearchResultType::Coach => self
                .participants
                .iter()
                .filter(|p| p.is_coach)
                .map(|p| self.participant_result(p))
                .collect(),
            SearchResultType::Match => {
                let names: HashMap<&TeamId, &str> =
                    self.teams.iter().map(|t| (&t.id, t.name.as_str())).collect();
                self.matches.iter().map(|m| match_result(m, &names)).collect()
            }
        }
    }

    fn participant_result(&self, participant: &Participant) -> SearchResult {
        let team_name = participant
            .team_id
            .as_ref()
            .and_then(|id| self.teams.iter().find(|t| &t.id == id))
            .map(|t| t.name.clone());
        SearchResult {
            id: participant.id.to_string(),
            name: participant.name.clone(),
            result_type: if participant.is_coach {
                SearchResultType::Coach
            } else {
                SearchResultType::Player
            },
            subtitle: participant.nickname.clone(),
            metadata: team_name,
        }
    }
}

fn championship_result(c: &Championship) -> SearchResult {
    SearchResult {
        id: c.id.to_string(),
        name: c.name.clone(),
        result_type: SearchResultType::Championship,
        subtitle: c.location.clone(),
        metadata: Some(format!("{} · {}", c.format, c.status)),
    }
}

fn team_result(t: &Team) -> SearchResult {
    SearchResult {
        id: t.id.to_string(),
        name: t.name.clone(),
        result_type: SearchResultType::Team,
        subtitle: t.manager_name.clone(),
        metadata: Some(format!("{} members", t.roster_size())),
    }
}

fn match_result(m: &Match, team_names: &HashMap<&TeamId, &str>) -> SearchResult {
    let name_of = |id: &TeamId| {
        team_names
            .get(id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| id.to_string())
    };
    SearchResult {
        id: m.id.to_string(),
        name: format!("{} vs {}", name_of(&m.team_a_id), name_of(&m.team_b_id)),
        result_type: SearchResultType::Match,
        subtitle: m.stage.clone(),
        metadata: Some(format_date(m.scheduled_at.date_naive())),
    }
}
