//! Plain-text rendering of core data for the terminal.

use tourneydesk_core::auth::SessionData;
use tourneydesk_core::models::{
    Championship, Match, Participant, ParticipantStatistic, Subscription, Team, User,
};
use tourneydesk_core::search::SearchResult;
use tourneydesk_core::stats::{PlayerSummary, TeamRecord};
use tourneydesk_core::utils::{format_date, format_phone, truncate};

const NAME_WIDTH: usize = 24;

pub fn championship_line(c: &Championship) -> String {
    format!(
        "{:<8} {:<name$} {:<18} {:<9} {}",
        c.id.as_str(),
        truncate(&c.name, NAME_WIDTH),
        c.format.to_string(),
        c.status.to_string(),
        c.date_range_display(),
        name = NAME_WIDTH,
    )
}

pub fn team_line(t: &Team) -> String {
    format!(
        "{:<8} {:<name$} {:<18} {} members",
        t.id.as_str(),
        truncate(&t.name, NAME_WIDTH),
        truncate(t.manager_display(), 18),
        t.roster_size(),
        name = NAME_WIDTH,
    )
}

pub fn participant_line(p: &Participant) -> String {
    let phone = p.phone.as_deref().map(format_phone).unwrap_or_default();
    let team = p.team_id.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
    format!(
        "{:<8} {:<name$} {:<7} {:<8} {}",
        p.id.as_str(),
        truncate(&p.display_name(), NAME_WIDTH),
        p.role().to_string(),
        team,
        phone,
        name = NAME_WIDTH,
    )
}

pub fn match_line(m: &Match) -> String {
    format!(
        "{:<8} {} {} vs {} [{}] {}",
        m.id.as_str(),
        m.scheduled_at.format("%Y-%m-%d %H:%M"),
        m.team_a_id,
        m.team_b_id,
        m.status,
        m.score_display(),
    )
}

pub fn subscription_line(s: &Subscription) -> String {
    format!(
        "{:<8} team {} in championship {} since {}",
        s.id.as_str(),
        s.team_id,
        s.championship_id,
        format_date(s.subscribed_on),
    )
}

pub fn statistic_line(s: &ParticipantStatistic) -> String {
    format!(
        "{:<8} {} @ {}: {}/{}/{}{}",
        s.id.as_str(),
        s.participant_id,
        s.match_id,
        s.kills,
        s.deaths,
        s.assists,
        if s.mvp { " MVP" } else { "" },
    )
}

pub fn user_line(u: &User) -> String {
    format!("{:<8} {:<20} {}", u.id.as_str(), u.username, u.role)
}

pub fn session_summary(data: &SessionData, max_age: chrono::Duration) -> String {
    let expiry = if data.is_expired(max_age) {
        "expired".to_string()
    } else {
        format!("expires in {} min", data.minutes_until_expiry(max_age))
    };
    format!(
        "{} (user {}, role {}), {}",
        data.username, data.user_id, data.role, expiry
    )
}

/// Player table, rows in the given order
pub fn player_table(players: &[PlayerSummary]) -> String {
    let mut out = format!(
        "{:>3}  {:<name$} {:>4} {:>5} {:>6} {:>7} {:>6}  {:>5}\n",
        "#",
        "Player",
        "MP",
        "Kills",
        "Deaths",
        "Assists",
        "KDA",
        "MVPs",
        name = NAME_WIDTH,
    );
    for (i, p) in players.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<name$} {:>4} {:>5} {:>6} {:>7} {:>6}  {:>5}\n",
            i + 1,
            truncate(&p.name, NAME_WIDTH),
            p.matches,
            p.kills,
            p.deaths,
            p.assists,
            p.kda(),
            p.mvps,
            name = NAME_WIDTH,
        ));
    }
    out
}

pub fn team_record(team: Option<&Team>, record: &TeamRecord, recent: &[&Match]) -> String {
    let name = team.map(|t| t.name.as_str()).unwrap_or(record.team_id.as_str());
    let mut out = format!(
        "{}: {}W {}L {}D ({} played), win rate {}\n",
        name,
        record.wins,
        record.losses,
        record.draws,
        record.played(),
        record.win_rate(),
    );
    for m in recent {
        let opponent = m
            .opponent_of(&record.team_id)
            .map(|id| id.to_string())
            .unwrap_or_default();
        let outcome = m
            .outcome_for(&record.team_id)
            .map(|o| format!("{:?}", o))
            .unwrap_or_else(|| m.status.to_string());
        out.push_str(&format!(
            "  {} vs {:<10} {:<9} {}\n",
            format_date(m.scheduled_at.date_naive()),
            opponent,
            outcome,
            m.score_display(),
        ));
    }
    out
}

pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results\n".to_string();
    }
    let mut out = String::new();
    for r in results {
        out.push_str(&format!("[{:<12}] {} ({})", r.result_type.to_string(), r.name, r.id));
        if let Some(ref subtitle) = r.subtitle {
            out.push_str(&format!(" - {}", subtitle));
        }
        if let Some(ref metadata) = r.metadata {
            out.push_str(&format!(" · {}", metadata));
        }
        out.push('\n');
    }
    out
}
