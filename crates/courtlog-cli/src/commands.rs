use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use colored::Colorize;
use courtlog_core::{
    AccountService, CleanupReport, CompetitionSummary, DeleteOutcome, HierarchyService,
    MatchSummary, Upload,
};
use courtlog_media::FsMediaStore;
use courtlog_store::FileEntityStore;
use courtlog_types::{
    Competition, CompetitionDetails, Game, GameDetails, Match, MatchDetails, MatchType,
    NewUser, Node, NodeKey, Outcome, User, UserId,
};
use serde::Serialize;

use crate::cli::*;
use crate::config::CliConfig;

/// Stored for accounts created here; no password can match it.
const NO_CREDENTIAL: &str = "!";

type Service = HierarchyService<FileEntityStore, FsMediaStore>;

struct Journal {
    service: Service,
    accounts: AccountService<FileEntityStore>,
    format: OutputFormat,
    user: Option<String>,
}

impl Journal {
    fn open(
        config: &CliConfig,
        format: OutputFormat,
        user: Option<String>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(
            FileEntityStore::open(config.journal_path())
                .with_context(|| format!("opening journal {}", config.journal_path().display()))?,
        );
        let media = Arc::new(
            FsMediaStore::open(config.media_config()).context("opening media directory")?,
        );
        Ok(Self {
            service: HierarchyService::new(Arc::clone(&store), media),
            accounts: AccountService::new(store),
            format,
            user,
        })
    }

    /// Resolve the acting user. Disabled accounts may not act.
    fn actor(&self) -> anyhow::Result<UserId> {
        let username = self.user.as_deref().ok_or_else(|| {
            anyhow!("no user given; pass --user or set default_user in the config")
        })?;
        let user = self
            .accounts
            .find_by_username(username)?
            .ok_or_else(|| anyhow!("unknown user {username:?}"))?;
        if !user.enabled {
            bail!("user {username:?} is disabled");
        }
        Ok(user.id())
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(value),
        }
        Ok(())
    }
}

pub fn run_command(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    let user = cli.user.or_else(|| config.default_user.clone());
    let journal = Journal::open(&config, cli.format, user)?;
    match cli.command {
        Command::User(args) => cmd_user(&journal, args.action),
        Command::Competition(args) => cmd_competition(&journal, args.action),
        Command::Match(args) => cmd_match(&journal, args.action),
        Command::Game(args) => cmd_game(&journal, args.action),
        Command::Media(args) => cmd_media(&journal, args.action),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Account fields safe to print.
#[derive(Serialize)]
struct UserView {
    id: UserId,
    username: String,
    email: String,
    phone_number: Option<String>,
    nickname: Option<String>,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            nickname: user.nickname,
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}

fn cmd_user(journal: &Journal, action: UserAction) -> anyhow::Result<()> {
    let accounts = &journal.accounts;
    let find = |username: &str| -> anyhow::Result<User> {
        accounts
            .find_by_username(username)?
            .ok_or_else(|| anyhow!("unknown user {username:?}"))
    };
    let user = match action {
        UserAction::Add {
            username,
            email,
            phone,
            nickname,
        } => accounts.register(NewUser {
            username,
            email,
            phone_number: phone,
            nickname,
            credential_hash: NO_CREDENTIAL.into(),
        })?,
        UserAction::Show { username } => find(&username)?,
        UserAction::Enable { username } => accounts.set_enabled(find(&username)?.id(), true)?,
        UserAction::Disable { username } => accounts.set_enabled(find(&username)?.id(), false)?,
    };
    journal.emit(&UserView::from(user), |u| {
        let state = if u.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("{} {} <{}> ({state})", u.username.bold(), u.id.to_string().dimmed(), u.email);
        if let Some(nickname) = &u.nickname {
            println!("  Nickname: {nickname}");
        }
    })
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

impl CompetitionFields {
    fn create(self) -> anyhow::Result<CompetitionDetails> {
        let (Some(name), Some(start), Some(city)) =
            (self.name.clone(), self.start, self.city.clone())
        else {
            bail!("--name, --start and --city are required");
        };
        let end = self.end.unwrap_or(start);
        Ok(self.apply_to(CompetitionDetails::new(name, start, end, city)))
    }

    fn apply_to(self, mut d: CompetitionDetails) -> CompetitionDetails {
        if let Some(v) = self.name {
            d.name = v;
        }
        if let Some(v) = self.start {
            d.start_date = v;
        }
        if let Some(v) = self.end {
            d.end_date = v;
        }
        if let Some(v) = self.city {
            d.city = v;
        }
        d.venue = self.venue.or(d.venue);
        d.result = self.result.or(d.result);
        d.coach_comment = self.coach_comment.or(d.coach_comment);
        d.self_summary = self.summary.or(d.self_summary);
        d
    }
}

fn cmd_competition(journal: &Journal, action: CompetitionAction) -> anyhow::Result<()> {
    let svc = &journal.service;
    let actor = journal.actor()?;
    match action {
        CompetitionAction::Create(fields) => {
            let c = svc.create_competition(actor, fields.create()?)?;
            journal.emit(&c, |c| {
                println!("{} Recorded competition {}", "✓".green().bold(), c.id());
                print_competition(c);
            })
        }
        CompetitionAction::List => {
            let list = svc.list_competitions(actor)?;
            journal.emit(&list, |list| {
                if list.is_empty() {
                    println!("No competitions recorded.");
                }
                list.iter().for_each(print_competition_line);
            })
        }
        CompetitionAction::Show { id } => {
            let c = svc.get_competition(actor, id)?;
            journal.emit(&c, print_competition)
        }
        CompetitionAction::Update { id, fields } => {
            let current = svc.get_competition(actor, id)?;
            let c = svc.update_competition(actor, id, fields.apply_to(current.details))?;
            journal.emit(&c, |c| {
                println!("{} Updated competition {}", "✓".green().bold(), c.id());
                print_competition(c);
            })
        }
        CompetitionAction::Delete { id } => {
            let outcome = svc.delete_competition(actor, id)?;
            journal.emit(&outcome, print_deleted)
        }
    }
}

fn print_competition(c: &Competition) {
    let d = &c.details;
    println!("{}  {}", d.name.bold(), c.id().to_string().dimmed());
    println!("  Dates: {} to {}", d.start_date, d.end_date);
    match &d.venue {
        Some(venue) => println!("  Where: {venue}, {}", d.city),
        None => println!("  Where: {}", d.city),
    }
    if let Some(result) = d.result {
        println!("  Result: {}", result.to_string().yellow());
    }
    print_notes(&d.coach_comment, &d.self_summary);
    for photo in c.photos() {
        println!("  Photo: {photo}");
    }
}

fn print_competition_line(s: &CompetitionSummary) {
    let c = &s.competition;
    let result = c
        .details
        .result
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{}  {}  {}  {}  {} matches  {}",
        c.id().short_id().yellow(),
        c.details.start_date,
        c.details.name.bold(),
        c.details.city,
        s.match_count,
        result
    );
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

impl MatchFields {
    fn create(self) -> anyhow::Result<MatchDetails> {
        let (Some(opponent), Some(city), Some(result)) =
            (self.opponent.clone(), self.opponent_city.clone(), self.result)
        else {
            bail!("--opponent, --opponent-city and --result are required");
        };
        let match_type = self.match_type.unwrap_or(MatchType::GroupStage);
        Ok(self.apply_to(MatchDetails::new(match_type, opponent, city, result)))
    }

    fn apply_to(self, mut d: MatchDetails) -> MatchDetails {
        if let Some(v) = self.match_type {
            d.match_type = v;
        }
        if let Some(v) = self.opponent {
            d.opponent_name = v;
        }
        if let Some(v) = self.opponent_city {
            d.opponent_city = v;
        }
        if let Some(v) = self.result {
            d.result = v;
        }
        d.opponent_club = self.club.or(d.opponent_club);
        d.scheduled_at = self.at.or(d.scheduled_at);
        d.score = self.score.or(d.score);
        d.coach_comment = self.coach_comment.or(d.coach_comment);
        d.self_summary = self.summary.or(d.self_summary);
        d
    }
}

fn cmd_match(journal: &Journal, action: MatchAction) -> anyhow::Result<()> {
    let svc = &journal.service;
    let actor = journal.actor()?;
    match action {
        MatchAction::Create {
            competition,
            fields,
        } => {
            let m = svc.create_match(actor, competition, fields.create()?)?;
            journal.emit(&m, |m| {
                println!("{} Recorded match {}", "✓".green().bold(), m.id());
                print_match(m);
            })
        }
        MatchAction::List { competition } => {
            let list = svc.list_matches(actor, competition)?;
            journal.emit(&list, |list| {
                if list.is_empty() {
                    println!("No matches recorded.");
                }
                list.iter().for_each(print_match_line);
            })
        }
        MatchAction::Show { id } => {
            let m = svc.get_match(actor, id)?;
            journal.emit(&m, print_match)
        }
        MatchAction::Update { id, fields } => {
            let current = svc.get_match(actor, id)?;
            let m = svc.update_match(actor, id, fields.apply_to(current.details))?;
            journal.emit(&m, |m| {
                println!("{} Updated match {}", "✓".green().bold(), m.id());
                print_match(m);
            })
        }
        MatchAction::Delete { id } => {
            let outcome = svc.delete_match(actor, id)?;
            journal.emit(&outcome, print_deleted)
        }
    }
}

fn outcome_label(outcome: Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Win => outcome.to_string().green(),
        Outcome::Lose => outcome.to_string().red(),
    }
}

fn print_match(m: &Match) {
    let d = &m.details;
    println!(
        "{} vs {} ({})  {}",
        d.match_type.to_string().bold(),
        d.opponent_name.bold(),
        d.opponent_city,
        m.id().to_string().dimmed()
    );
    if let Some(club) = &d.opponent_club {
        println!("  Club: {club}");
    }
    if let Some(at) = d.scheduled_at {
        println!("  At: {at}");
    }
    match &d.score {
        Some(score) => println!("  Result: {} {score}", outcome_label(d.result)),
        None => println!("  Result: {}", outcome_label(d.result)),
    }
    print_notes(&d.coach_comment, &d.self_summary);
}

fn print_match_line(s: &MatchSummary) {
    let m = &s.record;
    println!(
        "{}  {}  vs {}  {}  {} games",
        m.id().short_id().yellow(),
        m.details.match_type,
        m.details.opponent_name.bold(),
        outcome_label(m.details.result),
        s.game_count
    );
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

impl GameFields {
    fn create(self, next_number: u32) -> anyhow::Result<GameDetails> {
        let Some(score) = self.score.clone() else {
            bail!("--score is required");
        };
        let number = self.number.unwrap_or(next_number);
        Ok(self.apply_to(GameDetails::new(number, score, None)))
    }

    fn apply_to(self, mut d: GameDetails) -> GameDetails {
        if let Some(v) = self.number {
            d.game_number = v;
        }
        if let Some(v) = self.score {
            d.score = v;
        }
        d.result = self.result.or(d.result);
        d.coach_comment = self.coach_comment.or(d.coach_comment);
        d.self_summary = self.summary.or(d.self_summary);
        d
    }
}

fn cmd_game(journal: &Journal, action: GameAction) -> anyhow::Result<()> {
    let svc = &journal.service;
    let actor = journal.actor()?;
    match action {
        GameAction::Create { match_id, fields } => {
            let next = svc.next_game_number(actor, match_id)?;
            let g = svc.create_game(actor, match_id, fields.create(next)?)?;
            journal.emit(&g, |g| {
                println!("{} Recorded game {}", "✓".green().bold(), g.id());
                print_game(g);
            })
        }
        GameAction::List { match_id } => {
            let games = svc.list_games(actor, match_id)?;
            journal.emit(&games, |games| {
                if games.is_empty() {
                    println!("No games recorded.");
                }
                games.iter().for_each(print_game);
            })
        }
        GameAction::Show { id } => {
            let g = svc.get_game(actor, id)?;
            journal.emit(&g, print_game)
        }
        GameAction::Update { id, fields } => {
            let current = svc.get_game(actor, id)?;
            let g = svc.update_game(actor, id, fields.apply_to(current.details))?;
            journal.emit(&g, |g| {
                println!("{} Updated game {}", "✓".green().bold(), g.id());
                print_game(g);
            })
        }
        GameAction::Delete { id } => {
            let outcome = svc.delete_game(actor, id)?;
            journal.emit(&outcome, print_deleted)
        }
    }
}

fn print_game(g: &Game) {
    let d = &g.details;
    let result = d.result.map(outcome_label).unwrap_or_else(|| "-".normal());
    println!(
        "Game {}: {} {}  {}",
        d.game_number.to_string().bold(),
        d.score,
        result,
        g.id().short_id().dimmed()
    );
    print_notes(&d.coach_comment, &d.self_summary);
    for video in g.videos() {
        println!("  Video: {video}");
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

fn cmd_media(journal: &Journal, action: MediaAction) -> anyhow::Result<()> {
    let svc = &journal.service;
    let actor = journal.actor()?;
    match action {
        MediaAction::Upload { target, files } => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let node: Node = match target_key(&target)? {
                NodeKey::Competition(id) => svc.upload_photos(actor, id, &uploads)?.into(),
                NodeKey::Game(id) => {
                    let mut game = None;
                    for upload in &uploads {
                        game = Some(svc.upload_video(actor, id, upload)?);
                    }
                    game.map(Node::from)
                        .ok_or_else(|| anyhow!("no files to upload"))?
                }
                NodeKey::Match(_) => bail!("matches do not hold media"),
            };
            journal.emit(&node, |node| {
                println!("{} Uploaded {} file(s)", "✓".green().bold(), uploads.len());
                print_node(node);
            })
        }
        MediaAction::Attach { target, references } => {
            let node = svc.add_media(actor, target_key(&target)?, references)?;
            journal.emit(&node, print_node)
        }
        MediaAction::Detach { target, references } => {
            let removal = svc.remove_media(actor, target_key(&target)?, &references)?;
            journal.emit(&removal, |r| {
                println!("{} Detached {} reference(s)", "✓".green().bold(), r.removed.len());
                print_cleanup(&r.cleanup);
                print_node(&r.node);
            })
        }
        MediaAction::Load {
            target,
            reference,
            output,
        } => {
            let content = svc.load_media(actor, target_key(&target)?, &reference)?;
            let path = output.unwrap_or_else(|| PathBuf::from(reference.file_name()));
            fs::write(&path, &content.data)
                .with_context(|| format!("writing {}", path.display()))?;
            let written = serde_json::json!({
                "reference": content.reference,
                "content_type": content.content_type,
                "bytes": content.data.len(),
                "path": path,
            });
            journal.emit(&written, |_| {
                println!(
                    "{} Wrote {} bytes ({}) to {}",
                    "✓".green().bold(),
                    content.data.len(),
                    content.content_type,
                    path.display()
                );
            })
        }
    }
}

fn target_key(target: &NodeTarget) -> anyhow::Result<NodeKey> {
    target
        .key()
        .ok_or_else(|| anyhow!("give exactly one of --competition or --game"))
}

fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    Ok(Upload::new(file_name, data))
}

fn print_node(node: &Node) {
    match node {
        Node::Competition(c) => print_competition(c),
        Node::Match(m) => print_match(m),
        Node::Game(g) => print_game(g),
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn print_notes(coach_comment: &Option<String>, self_summary: &Option<String>) {
    if let Some(comment) = coach_comment {
        println!("  Coach: {comment}");
    }
    if let Some(summary) = self_summary {
        println!("  Notes: {summary}");
    }
}

fn print_deleted(outcome: &DeleteOutcome) {
    let r = outcome.removed;
    println!(
        "{} Deleted {} competition(s), {} match(es), {} game(s)",
        "✓".green().bold(),
        r.competitions,
        r.matches,
        r.games
    );
    print_cleanup(&outcome.cleanup);
}

fn print_cleanup(report: &CleanupReport) {
    if !report.deleted.is_empty() {
        println!("  Removed {} media file(s)", report.deleted.len());
    }
    for failure in &report.failures {
        println!(
            "  {} could not remove {}: {}",
            "warning:".yellow().bold(),
            failure.reference,
            failure.error
        );
    }
}
