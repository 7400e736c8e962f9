use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tourneydesk_core::api::ApiClient;
use tourneydesk_core::auth::{CredentialStore, Session};
use tourneydesk_core::cache::{QueryCache, QueryKey};
use tourneydesk_core::config::Config;
use tourneydesk_core::models::{
    Championship, ChampionshipId, Entity, EntityKind, Match, Participant, ParticipantStatistic,
    PlayerStatsRow, Subscription, SubscriptionId, Team, TeamId,
};
use tourneydesk_core::repository::{
    Backend, Notification, NotificationLevel, Notifier, RemoteBackend, Repository,
};
use tourneydesk_core::search::{
    RemoteSearchSource, SearchOptions, SearchResultType, SearchState, UniversalSearch,
};
use tourneydesk_core::stats::{leaderboard, summarize_players, PlayerSummary, TeamRecord};

use crate::views;

/// Cache resource for the aggregated per-player statistics
const PLAYER_STATS_RESOURCE: &str = "player-stats";

/// Matches shown under a team record
const RECENT_MATCHES: usize = 5;

pub struct App {
    config: Config,
    session: Session,
    api: ApiClient,
    cache: QueryCache,
    credentials: CredentialStore,
    notifier: Notifier,
    notifications: mpsc::UnboundedReceiver<Notification>,
    /// Print pretty JSON instead of text tables
    json: bool,
}

impl App {
    pub async fn new(json: bool) -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        debug!(api = %config.api_base_url, "Config loaded");

        let cache_dir = config.cache_dir()?;
        let mut session = Session::new(
            cache_dir,
            config.session_max_age(),
            config.session_secret.clone(),
        );
        match session.load() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Ignoring unreadable session file"),
        }

        let mut api = ApiClient::new(config.api_base_url.clone())?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }

        let cache = QueryCache::new(config.cache_stale_after());
        let (notifier, notifications) = Notifier::channel();

        Ok(Self {
            config,
            session,
            api,
            cache,
            credentials: CredentialStore::default(),
            notifier,
            notifications,
            json,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, username: Option<&str>) -> Result<()> {
        let username = match username {
            Some(u) => u.to_string(),
            None => self.prompt_username()?,
        };
        if username.is_empty() {
            bail!("Username required");
        }

        let password = if self.credentials.has_credentials(&username) {
            print!("Use stored password? [Y/n]: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if input.trim().to_lowercase() != "n" {
                self.credentials.recall(&username)?
            } else {
                rpassword::prompt_password("Password: ")?
            }
        } else {
            rpassword::prompt_password("Password: ")?
        };

        let session_data = self
            .api
            .login(&username, &password)
            .await
            .context("Login failed")?;

        if let Err(e) = self.credentials.remember(&username, &password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.api.set_token(session_data.token.clone());
        self.session.update(session_data);
        self.session.save().context("Failed to save session")?;

        if let Some(ref data) = self.session.data {
            info!(username = %data.username, role = %data.role, "Login successful");
            println!("Logged in as {} ({})", data.username, data.role);
        }
        Ok(())
    }

    fn prompt_username(&self) -> Result<String> {
        match self.config.last_username {
            Some(ref last) => print!("Username [{}]: ", last),
            None => print!("Username: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();
        if input.is_empty() {
            Ok(self.config.last_username.clone().unwrap_or_default())
        } else {
            Ok(input.to_string())
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        let username = self.session.data.as_ref().map(|d| d.username.clone());
        self.session.clear()?;
        self.api.clear_token();
        if let Some(ref username) = username {
            if let Err(e) = self.credentials.forget(username) {
                debug!(error = %e, "No stored credentials to forget");
            }
        }
        println!("Logged out");
        Ok(())
    }

    pub fn whoami(&self) -> Result<()> {
        match self.session.data {
            Some(ref data) => println!("{}", views::session_summary(data, self.session.max_age())),
            None => println!("Not logged in"),
        }
        Ok(())
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_valid() {
            Ok(())
        } else {
            bail!("Not logged in. Run `tourneydesk login` first.")
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn ping(&self) -> Result<()> {
        self.api.ping().await?;
        println!("Backend reachable at {}", self.api.base_url());
        Ok(())
    }

    pub async fn users(&self) -> Result<()> {
        self.require_session()?;
        let users = self.api.fetch_users().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&users)?);
            return Ok(());
        }
        for user in &users {
            println!("{}", views::user_line(user));
        }
        Ok(())
    }

    pub async fn list(&self, entity: &str) -> Result<()> {
        self.require_session()?;
        let lines: Vec<String> = match parse_kind(entity)? {
            EntityKind::Championship => render(self.fetch_all::<Championship>().await?, views::championship_line),
            EntityKind::Team => render(self.fetch_all::<Team>().await?, views::team_line),
            EntityKind::Participant => render(self.fetch_all::<Participant>().await?, views::participant_line),
            EntityKind::Match => render(self.fetch_all::<Match>().await?, views::match_line),
            EntityKind::Subscription => render(self.fetch_all::<Subscription>().await?, views::subscription_line),
            EntityKind::ParticipantStatistic => {
                render(self.fetch_all::<ParticipantStatistic>().await?, views::statistic_line)
            }
        };
        if lines.is_empty() {
            println!("No {} found", entity);
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }

    /// Per-player totals computed from raw match statistics
    pub async fn stats(&self) -> Result<()> {
        self.require_session()?;
        let (statistics, participants) = futures::try_join!(
            self.fetch_all::<ParticipantStatistic>(),
            self.fetch_all::<Participant>(),
        )?;
        let summaries = summarize_players(&statistics, &participants);
        self.print_players(&summaries)
    }

    /// Aggregated statistics from the backend, ranked by KDA
    pub async fn leaderboard(&self, top: Option<usize>) -> Result<()> {
        self.require_session()?;
        let key = QueryKey::new(PLAYER_STATS_RESOURCE);
        let rows: Vec<PlayerStatsRow> = self
            .cache
            .get(&key, self.cache.options(), || self.api.fetch_player_stats())
            .await?;

        let mut ranked = leaderboard(rows.iter().map(PlayerSummary::from_row).collect());
        if let Some(top) = top {
            ranked.truncate(top);
        }
        self.print_players(&ranked)
    }

    pub async fn team_record(&self, team_id: &str) -> Result<()> {
        self.require_session()?;
        let team_id = TeamId::new(team_id);
        let (teams, matches) =
            futures::try_join!(self.fetch_all::<Team>(), self.fetch_all::<Match>())?;

        let team = teams.iter().find(|t| t.id == team_id);
        if team.is_none() {
            warn!(team = %team_id, "Team not in team list");
        }

        let record = TeamRecord::from_matches(&team_id, &matches);
        let mut recent: Vec<&Match> = matches.iter().filter(|m| m.involves(&team_id)).collect();
        recent.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        recent.truncate(RECENT_MATCHES);

        print!("{}", views::team_record(team, &record, &recent));
        Ok(())
    }

    pub async fn search(&self, query: &str, types: Vec<SearchResultType>) -> Result<()> {
        self.require_session()?;
        let options = SearchOptions::default();
        if !options.accepts(query) {
            bail!("Query too short");
        }

        let source = Arc::new(RemoteSearchSource::new(self.remote_backend()));
        let mut search = UniversalSearch::new(source, types, options);
        search.input(query);
        while search.next_update().await == SearchState::Loading {}

        let results = search.search_box().results();
        if self.json {
            println!("{}", serde_json::to_string_pretty(results)?);
        } else {
            print!("{}", views::search_results(results));
        }
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn subscribe(&self, team_id: &str, championship_id: &str) -> Result<()> {
        self.require_session()?;
        if let Some(role) = self.session.role().filter(|r| !r.can_edit()) {
            bail!("Role {} cannot create subscriptions", role);
        }
        let team_id = TeamId::new(team_id);
        let championship_id = ChampionshipId::new(championship_id);

        let championships = self.fetch_all::<Championship>().await?;
        let championship = championships
            .iter()
            .find(|c| c.id == championship_id)
            .ok_or_else(|| anyhow!("Championship {} not found", championship_id))?;
        if !championship.is_open_for_subscription() {
            bail!("{} is not open for subscriptions", championship.name);
        }

        let repo: Repository<Subscription, RemoteBackend> =
            Repository::new(self.remote_backend(), self.notifier.clone());
        repo.sync().await?;

        let subscription = Subscription {
            id: SubscriptionId::pending(),
            team_id,
            championship_id,
            subscribed_on: Utc::now().date_naive(),
        };
        let created = repo.create(subscription).await?;
        debug!(id = %created.id, "Subscription stored");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn print_players(&self, players: &[PlayerSummary]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(players)?);
        } else {
            print!("{}", views::player_table(players));
        }
        Ok(())
    }

    fn remote_backend(&self) -> RemoteBackend {
        RemoteBackend::new(self.api.clone(), self.cache.clone())
    }

    async fn fetch_all<T>(&self) -> Result<Vec<T>>
    where
        T: Entity,
        RemoteBackend: Backend<T>,
    {
        let repo: Repository<T, RemoteBackend> =
            Repository::new(self.remote_backend(), self.notifier.clone());
        repo.sync().await?;
        Ok(repo.get_all().await)
    }

    /// Print queued notifications
    pub fn flush_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            match notification.level {
                NotificationLevel::Success => println!("✓ {}", notification.message),
                NotificationLevel::Error => eprintln!("✗ {}", notification.message),
            }
        }
        let stats = self.cache.stats();
        debug!(hits = stats.hits, misses = stats.misses, "Cache usage");
    }
}

fn render<T>(items: Vec<T>, line: fn(&T) -> String) -> Vec<String> {
    items.iter().map(line).collect()
}

fn parse_kind(name: &str) -> Result<EntityKind> {
    let kind = match name.to_lowercase().as_str() {
        "championship" | "championships" => EntityKind::Championship,
        "team" | "teams" => EntityKind::Team,
        "participant" | "participants" => EntityKind::Participant,
        "match" | "matches" => EntityKind::Match,
        "subscription" | "subscriptions" => EntityKind::Subscription,
        "stat" | "stats" | "participant-stats" => EntityKind::ParticipantStatistic,
        other => bail!("Unknown entity '{}'", other),
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Teams").unwrap(), EntityKind::Team);
        assert_eq!(parse_kind("participant-stats").unwrap(), EntityKind::ParticipantStatistic);
        assert!(parse_kind("referees").is_err());
    }
}
