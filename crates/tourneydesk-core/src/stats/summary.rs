use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{
    Match, MatchOutcome, Participant, ParticipantId, ParticipantStatistic, PlayerStatsRow, TeamId,
};
use crate::utils::cmp_ignore_case;

use super::ratios::{compute_kda, compute_win_rate, kda_ratio};

/// Totals for one participant across matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub participant_id: Option<ParticipantId>,
    pub name: String,
    pub matches: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub plants: u32,
    pub defuses: u32,
    pub mvps: u32,
}

impl PlayerSummary {
    pub fn new(participant_id: Option<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            participant_id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sum every statistic belonging to `participant`
    pub fn from_statistics(
        participant: &ParticipantId,
        name: impl Into<String>,
        stats: &[ParticipantStatistic],
    ) -> Self {
        let mut summary = Self::new(Some(participant.clone()), name);
        let mut seen_matches = HashSet::new();
        for stat in stats.iter().filter(|s| &s.participant_id == participant) {
            if seen_matches.insert(&stat.match_id) {
                summary.matches += 1;
            }
            summary.add(stat);
        }
        summary
    }

    pub fn from_row(row: &PlayerStatsRow) -> Self {
        let name = match row.nickname.as_deref().filter(|n| !n.is_empty()) {
            Some(nick) => nick.to_string(),
            None => row.name.clone(),
        };
        Self {
            participant_id: row.participant_id.clone(),
            name,
            matches: row.matches,
            kills: row.kills,
            deaths: row.deaths,
            assists: row.assists,
            plants: row.plants,
            defuses: row.defuses,
            mvps: row.mvps,
        }
    }

    fn add(&mut self, stat: &ParticipantStatistic) {
        self.kills += stat.kills;
        self.deaths += stat.deaths;
        self.assists += stat.assists;
        self.plants += stat.plants;
        self.defuses += stat.defuses;
        if stat.mvp {
            self.mvps += 1;
        }
    }

    pub fn kda_ratio(&self) -> f64 {
        kda_ratio(self.kills, self.deaths, self.assists)
    }

    pub fn kda(&self) -> String {
        compute_kda(Some(self.kills), Some(self.deaths), Some(self.assists))
    }
}

/// One summary per participant that has statistics, in first-seen order.
/// Names come from `participants`; unknown ids fall back to the id itself.
pub fn summarize_players(
    stats: &[ParticipantStatistic],
    participants: &[Participant],
) -> Vec<PlayerSummary> {
    let names: HashMap<&ParticipantId, String> = participants
        .iter()
        .map(|p| (&p.id, p.display_name()))
        .collect();

    let mut order: Vec<&ParticipantId> = Vec::new();
    for stat in stats {
        if !order.contains(&&stat.participant_id) {
            order.push(&stat.participant_id);
        }
    }

    order
        .into_iter()
        .map(|id| {
            let name = names.get(id).cloned().unwrap_or_else(|| id.to_string());
            PlayerSummary::from_statistics(id, name, stats)
        })
        .collect()
}

/// Sort by KDA descending, then kills descending, then name
pub fn leaderboard(mut summaries: Vec<PlayerSummary>) -> Vec<PlayerSummary> {
    summaries.sort_by(|a, b| {
        b.kda_ratio()
            .total_cmp(&a.kda_ratio())
            .then_with(|| b.kills.cmp(&a.kills))
            .then_with(|| cmp_ignore_case(&a.name, &b.name))
    });
    summaries
}

/// Win/loss/draw record of a team over finished matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl TeamRecord {
    pub fn from_matches(team: &TeamId, matches: &[Match]) -> Self {
        let mut record = Self {
            team_id: team.clone(),
            wins: 0,
            losses: 0,
            draws: 0,
        };
        for outcome in matches.iter().filter_map(|m| m.outcome_for(team)) {
            match outcome {
                MatchOutcome::Win => record.wins += 1,
                MatchOutcome::Loss => record.losses += 1,
                MatchOutcome::Draw => record.draws += 1,
            }
        }
        record
    }

    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> String {
        compute_win_rate(Some(self.wins), Some(self.played()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChampionshipId, MatchId, MatchStatus, Score, StatisticId};

    fn stat(id: &str, participant: &str, match_id: &str, k: u32, d: u32, a: u32, mvp: bool) -> ParticipantStatistic {
        ParticipantStatistic {
            id: StatisticId::new(id),
            participant_id: ParticipantId::new(participant),
            match_id: MatchId::new(match_id),
            kills: k,
            deaths: d,
            assists: a,
            plants: 1,
            defuses: 0,
            mvp,
        }
    }

    fn finished(id: &str, a: &str, b: &str, score: (u32, u32)) -> Match {
        Match {
            id: MatchId::new(id),
            championship_id: ChampionshipId::new("c1"),
            team_a_id: TeamId::new(a),
            team_b_id: TeamId::new(b),
            scheduled_at: "2024-05-01T20:00:00Z".parse().unwrap(),
            stage: None,
            map: None,
            status: MatchStatus::Finished,
            score: Some(Score {
                team_a: score.0,
                team_b: score.1,
            }),
            winner_id: None,
        }
    }

    #[test]
    fn test_from_statistics_totals() {
        let stats = vec![
            stat("s1", "p1", "m1", 20, 10, 5, true),
            stat("s2", "p1", "m2", 10, 5, 5, false),
            stat("s3", "p2", "m1", 3, 12, 1, false),
        ];
        let summary = PlayerSummary::from_statistics(&ParticipantId::new("p1"), "Viper", &stats);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.kills, 30);
        assert_eq!(summary.deaths, 15);
        assert_eq!(summary.plants, 2);
        assert_eq!(summary.mvps, 1);
        assert_eq!(summary.kda(), "2.67");
    }

    #[test]
    fn test_summarize_players_uses_names() {
        let stats = vec![
            stat("s1", "p2", "m1", 3, 12, 1, false),
            stat("s2", "p1", "m1", 20, 10, 5, true),
        ];
        let participants = vec![Participant {
            id: ParticipantId::new("p1"),
            name: "Ana".to_string(),
            nickname: Some("Viper".to_string()),
            birth_date: None,
            phone: None,
            team_id: None,
            is_coach: false,
        }];
        let summaries = summarize_players(&stats, &participants);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "p2");
        assert_eq!(summaries[1].name, "Ana (Viper)");
    }

    #[test]
    fn test_leaderboard_order() {
        let mut a = PlayerSummary::new(None, "alpha");
        a.kills = 10;
        a.deaths = 10;
        let mut b = PlayerSummary::new(None, "bravo");
        b.kills = 30;
        b.deaths = 10;
        let mut c = PlayerSummary::new(None, "charlie");
        c.kills = 20;
        c.deaths = 0;
        let mut d = PlayerSummary::new(None, "Delta");
        d.kills = 10;
        d.deaths = 10;

        let names: Vec<String> = leaderboard(vec![a, b, c, d]).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["charlie", "bravo", "alpha", "Delta"]);
    }

    #[test]
    fn test_from_row_prefers_nickname() {
        let row = PlayerStatsRow {
            name: "Ana".to_string(),
            nickname: Some("Viper".to_string()),
            kills: 10,
            deaths: 0,
            assists: 5,
            ..Default::default()
        };
        let summary = PlayerSummary::from_row(&row);
        assert_eq!(summary.name, "Viper");
        assert_eq!(summary.kda(), "15.00");
    }

    #[test]
    fn test_team_record() {
        let matches = vec![
            finished("m1", "a", "b", (13, 7)),
            finished("m2", "c", "a", (13, 11)),
            finished("m3", "a", "d", (12, 12)),
            finished("m4", "b", "c", (13, 2)),
        ];
        let record = TeamRecord::from_matches(&TeamId::new("a"), &matches);
        assert_eq!((record.wins, record.losses, record.draws), (1, 1, 1));
        assert_eq!(record.win_rate(), "33%");

        let idle = TeamRecord::from_matches(&TeamId::new("z"), &matches);
        assert_eq!(idle.played(), 0);
        assert_eq!(idle.win_rate(), "0%");
    }
}
